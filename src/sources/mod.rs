pub mod base;
pub mod mapping;
pub mod local;
pub mod remote;

pub use base::MarketDataSource;
pub use local::LocalDataSource;
pub use remote::RemoteDataSource;
