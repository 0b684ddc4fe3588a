pub struct Env {
    pub database_url: String,
    pub redis_url: String,
    pub auth_jwt_secret: Option<String>,
    pub auth_jwt_public_key: Option<String>,
    pub webhook_secret: String,
    pub livekit_url: String,
    pub livekit_api_key: String,
    pub livekit_api_secret: String,
    pub upload_dir: String,
    pub media_base_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let auth_jwt_secret = std::env::var("AUTH_JWT_SECRET").ok().filter(|s| !s.is_empty());
        let auth_jwt_public_key =
            std::env::var("AUTH_JWT_PUBLIC_KEY").ok().filter(|s| !s.is_empty());
        assert!(
            auth_jwt_secret.is_some() || auth_jwt_public_key.is_some(),
            "AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY must be set in .env file or environment variable"
        );

        let webhook_secret = std::env::var("CLERK_WEBHOOK_SECRET")
            .expect("CLERK_WEBHOOK_SECRET must be set in .env file or environment variable");

        let livekit_url = std::env::var("LIVEKIT_URL").unwrap_or_default();
        let livekit_api_key = std::env::var("LIVEKIT_API_KEY").unwrap_or_default();
        let livekit_api_secret = std::env::var("LIVEKIT_API_SECRET").unwrap_or_default();

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let media_base_url =
            std::env::var("MEDIA_BASE_URL").unwrap_or_else(|_| "/uploads".to_string());

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env {
            database_url,
            redis_url,
            auth_jwt_secret,
            auth_jwt_public_key,
            webhook_secret,
            livekit_url,
            livekit_api_key,
            livekit_api_secret,
            upload_dir,
            media_base_url,
            frontend_url,
            ip,
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
