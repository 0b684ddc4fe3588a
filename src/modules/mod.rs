pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod friend {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod conversation {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod message {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod webhook {
    pub mod model;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod call {
    pub mod model;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod media {
    pub mod model;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod websocket;
