pub mod auth;
pub mod captcha;
pub mod integrations;
pub mod market;
pub mod middleware;
pub mod parcelles;
pub mod produits;
pub mod statistics;
pub mod superbuy;

pub use middleware::AuthenticatedUser;
