mod default;
pub use default::DefaultCredentialProvider;

mod edgerc;
pub use edgerc::EdgeRcCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;
