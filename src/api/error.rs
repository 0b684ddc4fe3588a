use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use deadpool_redis::{redis::RedisError, CreatePoolError, PoolError};
use std::borrow::Cow;

use crate::ENV;

/// Domain failures every query or mutation can report to its caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("User not found")]
    UserNotFound,
    #[error("Receiver not found")]
    ReceiverNotFound,
    #[error("Conversation not found")]
    ConversationNotFound,
    #[error("Not a member of this conversation")]
    NotAMember,
    #[error("Cannot send friend request to yourself")]
    FriendRequestToSelf,
    #[error("Invalid friend request")]
    FriendRequestInvalid,
    #[error("Request already exists")]
    FriendRequestAlreadyExists,
    #[error("Request already received")]
    FriendRequestAlreadyReceived,
    #[error("Already friends with {0}")]
    AlreadyFriends(String),
    #[error("Contact not found")]
    ContactNotFound,
    #[error("Sender not found")]
    SenderNotFound,
    #[error("Member not found")]
    MemberNotFound,
    #[error("Conversation is not a group")]
    NotAGroup,
    #[error("Conversation is not a direct conversation")]
    NotADirectConversation,
    #[error("Invalid message: {0}")]
    InvalidMessage(Cow<'static, str>),
    #[error("File upload failed: {0}")]
    FileUpload(Cow<'static, str>),
    #[error("Invalid webhook payload")]
    WebhookSignature,
}

impl ChatError {
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::NotAuthenticated => "NOT_AUTHENTICATED",
            ChatError::UserNotFound => "USER_NOT_FOUND",
            ChatError::ReceiverNotFound => "RECEIVER_NOT_FOUND",
            ChatError::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ChatError::NotAMember => "NOT_A_MEMBER",
            ChatError::FriendRequestToSelf => "FRIEND_REQUEST_TO_SELF",
            ChatError::FriendRequestInvalid => "FRIEND_REQUEST_INVALID",
            ChatError::FriendRequestAlreadyExists => "FRIEND_REQUEST_ALREADY_EXISTS",
            ChatError::FriendRequestAlreadyReceived => "FRIEND_REQUEST_ALREADY_RECEIVED",
            ChatError::AlreadyFriends(_) => "ALREADY_FRIENDS",
            ChatError::ContactNotFound => "CONTACT_NOT_FOUND",
            ChatError::SenderNotFound => "SENDER_NOT_FOUND",
            ChatError::MemberNotFound => "MEMBER_NOT_FOUND",
            ChatError::NotAGroup => "NOT_A_GROUP",
            ChatError::NotADirectConversation => "NOT_A_DIRECT_CONVERSATION",
            ChatError::InvalidMessage(_) => "INVALID_MESSAGE",
            ChatError::FileUpload(_) => "FILE_UPLOAD_FAILED",
            ChatError::WebhookSignature => "INVALID_WEBHOOK",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ChatError::NotAMember => StatusCode::FORBIDDEN,
            ChatError::UserNotFound
            | ChatError::ReceiverNotFound
            | ChatError::ConversationNotFound
            | ChatError::ContactNotFound
            | ChatError::SenderNotFound
            | ChatError::MemberNotFound => StatusCode::NOT_FOUND,
            ChatError::FriendRequestAlreadyExists
            | ChatError::FriendRequestAlreadyReceived
            | ChatError::AlreadyFriends(_) => StatusCode::CONFLICT,
            ChatError::FriendRequestToSelf
            | ChatError::FriendRequestInvalid
            | ChatError::NotAGroup
            | ChatError::NotADirectConversation
            | ChatError::InvalidMessage(_)
            | ChatError::FileUpload(_)
            | ChatError::WebhookSignature => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error(transparent)]
    Chat(ChatError),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "BAD_REQUEST",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Chat(e) => e.code(),
            Error::InternalServer => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<ChatError> for Error {
    fn from(value: ChatError) -> Self {
        Error::Chat(value)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Chat(e) => e.status_code(),
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());

        res.insert_header(("Access-Control-Allow-Origin", ENV.frontend_url.as_str()));
        res.insert_header(("Access-Control-Allow-Credentials", "true"));

        let message = match self {
            Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::BadRequest(msg)
            | Error::Forbidden(msg) => msg.clone(),
            Error::Chat(e) => e.to_string().into(),
            Error::InternalServer => "Internal Server Error".into(),
        };

        res.json(ErrorBody { code: self.code(), message })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    // jwt errors
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // redis errors
    #[error(transparent)]
    PoolInit(#[from] CreatePoolError),
    #[error("Redis pool error: {0}")]
    PoolGet(#[from] PoolError),
    #[error("Redis error")]
    RedisError(#[from] RedisError),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Database Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };

    // users_email_key -> "email"
    let field = constraint
        .trim_end_matches("_key")
        .split('_')
        .next_back()
        .unwrap_or("value");

    let mut chars = field.chars();
    let field = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Value".to_string(),
    };

    format!("{field} already exists").into()
}

#[derive(Debug)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::Chat(e) => Error::Chat(e),
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return SystemError::Conflict(Some(DbErrorMeta {
                    code: db_err.code().map(|s| s.to_string()),
                    constraint: db_err.constraint().map(|s| s.to_string()),
                    message: db_err.message().to_string(),
                }));
            }
            log::error!("Unhandled DB error: {:?}", db_err);
            return SystemError::DatabaseError(db_err.message().to_string().into());
        }
        log::error!("{:?}", err);
        SystemError::InternalError(Box::new(err))
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Unique violation raised by the named constraint or unique index.
    pub fn violates(&self, constraint: &str) -> bool {
        matches!(
            self,
            SystemError::Conflict(Some(meta)) if meta.constraint.as_deref() == Some(constraint)
        )
    }

    /// The domain failure carried by this error, if any.
    pub fn chat(&self) -> Option<&ChatError> {
        match self {
            SystemError::Chat(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_the_column() {
        let meta = Some(DbErrorMeta {
            code: Some("23505".into()),
            constraint: Some("users_email_key".into()),
            message: "duplicate key".into(),
        });
        assert_eq!(conflict_message(&meta), "Email already exists");
        assert_eq!(conflict_message(&None), "Duplicate value");
    }

    #[test]
    fn chat_errors_map_to_labelled_statuses() {
        assert_eq!(ChatError::NotAuthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ChatError::NotAMember.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ChatError::ConversationNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ChatError::AlreadyFriends("a@b.c".into()).code(), "ALREADY_FRIENDS");
        assert_eq!(ChatError::WebhookSignature.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn violation_is_matched_by_constraint_name() {
        let err = SystemError::Conflict(Some(DbErrorMeta {
            code: Some("23505".into()),
            constraint: Some("friend_requests_pair_key".into()),
            message: "duplicate key".into(),
        }));
        assert!(err.violates("friend_requests_pair_key"));
        assert!(!err.violates("contacts_pair_key"));
        assert!(!SystemError::Conflict(None).violates("friend_requests_pair_key"));
    }

    #[test]
    fn system_error_keeps_domain_failure() {
        let err: Error = SystemError::from(ChatError::NotAMember).into();
        assert!(matches!(err, Error::Chat(ChatError::NotAMember)));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
