//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed blog entities (users, articles,
//! comments), the driven ports they are stored through, and the services the
//! inbound adapters call. Types document their invariants and serde
//! contracts in their own Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User / Article / Comment: stored documents, with their drafts, patches
//!   and client views.
//! - EntityService: generic CRUD and cursor pagination over an
//!   EntityDescriptor; UserService, ArticleService and CommentService build on
//!   it.
//! - Principal / assert_owner_or_admin: authorisation guard.

pub mod article;
pub mod article_service;
pub mod auth;
pub mod blog_services;
pub mod comment;
pub mod comment_service;
pub mod dependency;
pub mod document;
pub mod entity_service;
pub mod error;
pub mod ids;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::article::{
    Article, ArticleContent, ArticlePatch, ArticlePayload, ArticleSummary, ArticleTitle,
    ArticleValidationError, ArticleView, NewArticle,
};
pub use self::article_service::{ArticleDescriptor, ArticleService};
pub use self::auth::{LoginCredentials, LoginValidationError, Principal, assert_owner_or_admin};
pub use self::blog_services::BlogServices;
pub use self::comment::{
    COMMENT_MAX, COMMENT_MIN, Comment, CommentContent, CommentPatch, CommentValidationError,
    CommentView, NewComment,
};
pub use self::comment_service::{CommentDescriptor, CommentService};
pub use self::dependency::{
    ArticleDependencies, CommentClaim, CommentDependencies, CommentReferences,
    DependencyValidator, NoDependencies,
};
pub use self::document::{Collection, Document};
pub use self::entity_service::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, EntityDescriptor, EntityService, PageRequest,
    PageSlice,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{ArticleId, CommentId, DocumentId, IdValidationError, UserId};
pub use self::password::{
    DEFAULT_PASSWORD_COST, MAX_PASSWORD_COST, MIN_PASSWORD_COST, PasswordHash, PasswordHasher,
    PasswordValidationError, PlainPassword,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, NewUser, PersonName, Role, User, UserChanges, UserDraft, UserPatch, UserValidationError,
    UserView,
};
pub use self::user_service::UserService;

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use blog_backend::domain::{Error, DomainResult};
///
/// fn guarded() -> DomainResult<()> {
///     Err(Error::unauthorized("Unauthorized"))
/// }
/// assert!(guarded().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
