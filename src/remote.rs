pub mod client;
pub use client::RemoteClient;
pub mod query;
pub mod storage;
pub use storage::TokenStorage;
pub mod leads_repo;
pub use leads_repo::LeadsRepository;
pub mod validation_repo;
pub use validation_repo::ValidacaoRepository;
pub mod messages_repo;
pub use messages_repo::MensagensRepository;
pub mod profile_repo;
pub use profile_repo::PerfilRepository;
pub mod users_repo;
pub use users_repo::UsuariosRepository;
