use std::sync::Arc;

pub mod config;
pub mod count;
pub mod detect;
pub mod domain {
    pub mod query;
}
pub mod fallback;
pub mod http {
    pub mod handlers {
        pub mod attribute;
        pub mod chat;
        pub mod health;
        pub mod proxy;
    }
    pub mod middleware;
    pub mod server;
}
pub mod router {
    pub mod priority;
}
pub mod store;
pub mod upstream;

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<store::RecordTable>,
    pub registry: upstream::EndpointRegistry,
    pub forwarder: upstream::forward::Forwarder,
}
