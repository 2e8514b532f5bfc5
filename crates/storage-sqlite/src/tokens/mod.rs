mod repository;

pub use repository::TokenRepository;
