//! User accounts: signup, login, lookups and cascading removal.

use async_trait::async_trait;
use tracing::info;

use super::article::Article;
use super::auth::LoginCredentials;
use super::comment::Comment;
use super::dependency::NoDependencies;
use super::document::Collection;
use super::entity_service::{EntityDescriptor, EntityService, PageRequest, PageSlice};
use super::password::PasswordHasher;
use super::ports::{Filter, Query};
use super::user::{Email, NewUser, User, UserPatch, UserView};
use super::{Error, UserId};

/// Message returned for any failed login, whichever part was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
/// Message returned when an email is already registered.
pub const EMAIL_TAKEN: &str = "Email is already registered";

/// Users resolve to their password-free view.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDescriptor;

#[async_trait]
impl EntityDescriptor for UserDescriptor {
    type Record = User;
    type View = UserView;

    async fn resolve(&self, record: &User) -> Result<UserView, Error> {
        Ok(UserView::from(record))
    }
}

/// Account operations.
pub struct UserService {
    entities: EntityService<UserDescriptor>,
    articles: Collection<Article>,
    comments: Collection<Comment>,
    hasher: PasswordHasher,
}

impl UserService {
    /// Service over the users collection; deletes cascade into `articles`
    /// and `comments`.
    pub fn new(
        users: Collection<User>,
        articles: Collection<Article>,
        comments: Collection<Comment>,
        hasher: PasswordHasher,
        max_page_size: usize,
    ) -> Self {
        Self {
            entities: EntityService::new(users, UserDescriptor, max_page_size),
            articles,
            comments,
            hasher,
        }
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, Error> {
        let query = Query::matching(Filter::new().eq("email", email.to_string())).limit(1);
        Ok(self
            .entities
            .records()
            .find_where(&query)
            .await?
            .into_iter()
            .next())
    }

    /// Register a new account. The store rejects an email that is already
    /// registered with [`EMAIL_TAKEN`].
    pub async fn signup(&self, signup: NewUser) -> Result<UserView, Error> {
        let password = self.hasher.hash(signup.password().clone()).await?;
        let view = self
            .entities
            .create(&NoDependencies, (), |()| signup.into_draft(password))
            .await?;
        info!(user_id = %view.id, "user signed up");
        Ok(view)
    }

    /// Verify credentials and return the account.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(user) = self.find_by_email(credentials.email()).await? else {
            return Err(Error::unauthenticated(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(user.password().clone(), credentials.password().clone())
            .await?;
        if matches {
            Ok(user)
        } else {
            Err(Error::unauthenticated(INVALID_CREDENTIALS))
        }
    }

    /// Stored account, if any.
    pub async fn find_record(&self, id: UserId) -> Result<Option<User>, Error> {
        self.entities.find_record(id).await
    }

    /// One user by identifier.
    pub async fn get_by_id(&self, id: UserId) -> Result<UserView, Error> {
        self.entities.get_by_id(id).await
    }

    /// One user by exact (normalised) email.
    pub async fn get_by_email(&self, email: &Email) -> Result<UserView, Error> {
        self.find_by_email(email)
            .await?
            .map(|user| UserView::from(&user))
            .ok_or_else(|| Error::not_found("Invalid user email"))
    }

    /// Ascending page of users.
    pub async fn list_page(
        &self,
        request: PageRequest<UserId>,
    ) -> Result<PageSlice<UserView, UserId>, Error> {
        self.entities.list_page(request).await
    }

    /// Merge `patch`, hashing a new password first. A changed email must stay
    /// unique.
    pub async fn update(&self, id: UserId, mut patch: UserPatch) -> Result<UserView, Error> {
        let password = match patch.password.take() {
            Some(plain) => Some(self.hasher.hash(plain).await?),
            None => None,
        };
        self.entities.update(id, &patch.into_changes(password)).await
    }

    /// Remove the account together with its articles, the comments on those
    /// articles and the comments it wrote elsewhere.
    ///
    /// The cascade is not transactional: a failure part-way leaves the user
    /// removed and some content in place.
    pub async fn delete(&self, id: UserId) -> Result<bool, Error> {
        if !self.entities.delete(id).await? {
            return Ok(false);
        }
        let author = id.to_string();
        let authored = self
            .articles
            .find_where(&Query::matching(Filter::new().eq("author", author.as_str())))
            .await?;
        for article in &authored {
            self.comments
                .delete_where(&Filter::new().eq("article", article.id().to_string()))
                .await?;
        }
        let articles = self
            .articles
            .delete_where(&Filter::new().eq("author", author.as_str()))
            .await?;
        let comments = self
            .comments
            .delete_where(&Filter::new().eq("author", author.as_str()))
            .await?;
        info!(
            user_id = %id,
            articles = articles.deleted_count,
            comments = comments.deleted_count,
            "user deleted with authored content"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role};
    use crate::test_support::BlogFixture;
    use futures_util::future::join_all;
    use rstest::{fixture, rstest};

    #[fixture]
    fn blog() -> BlogFixture {
        BlogFixture::new()
    }

    fn draft(email: &str) -> NewUser {
        NewUser::try_from_parts("first", "last", email, "yahoo!XD123").expect("valid signup")
    }

    #[rstest]
    #[tokio::test]
    async fn signup_rejects_duplicate_emails(blog: BlogFixture) {
        blog.users.signup(draft("a@x.com")).await.expect("first signup");

        let err = blog
            .users
            .signup(draft("A@X.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.message(), EMAIL_TAKEN);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_signups_with_one_email_register_once(blog: BlogFixture) {
        let attempts = (0..6).map(|_| blog.users.signup(draft("race@x.com")));
        let outcomes = join_all(attempts).await;

        let created = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let rejected: Vec<_> = outcomes.into_iter().filter_map(Result::err).collect();
        assert_eq!(created, 1);
        assert_eq!(rejected.len(), 5);
        assert!(
            rejected
                .iter()
                .all(|err| err.code() == ErrorCode::InvalidInput && err.message() == EMAIL_TAKEN)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn signup_creates_regular_users(blog: BlogFixture) {
        let view = blog.users.signup(draft("a@x.com")).await.expect("signup");
        assert_eq!(view.role, Role::Regular);
        assert_eq!(view.user_id, view.id);
    }

    #[rstest]
    #[case("a@x.com", "yahoo!XD123", true)]
    #[case("a@x.com", "wrong-password", false)]
    #[case("b@x.com", "yahoo!XD123", false)]
    #[tokio::test]
    async fn authenticate_checks_email_and_password(
        blog: BlogFixture,
        #[case] email: &str,
        #[case] password: &str,
        #[case] accepted: bool,
    ) {
        blog.users.signup(draft("a@x.com")).await.expect("signup");
        let credentials = LoginCredentials::try_from_parts(email, password).expect("credentials");

        match blog.users.authenticate(&credentials).await {
            Ok(user) => {
                assert!(accepted);
                assert_eq!(user.email().as_ref(), "a@x.com");
            }
            Err(err) => {
                assert!(!accepted);
                assert_eq!(err.code(), ErrorCode::Unauthenticated);
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn get_by_email_finds_normalised_address(blog: BlogFixture) {
        let created = blog.users.signup(draft("a@x.com")).await.expect("signup");
        let email = Email::parse(" A@x.COM ").expect("valid email");

        let found = blog.users.get_by_email(&email).await.expect("lookup");
        assert_eq!(found.id, created.id);
    }

    #[rstest]
    #[tokio::test]
    async fn update_refuses_an_email_held_by_someone_else(blog: BlogFixture) {
        blog.users.signup(draft("a@x.com")).await.expect("signup a");
        let b = blog.users.signup(draft("b@x.com")).await.expect("signup b");
        let patch = UserPatch::try_from_parts(None, None, Some("a@x.com"), None, None)
            .expect("valid patch");

        let err = blog.users.update(b.id, patch).await.expect_err("taken");
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.message(), EMAIL_TAKEN);
    }

    #[rstest]
    #[tokio::test]
    async fn password_changes_are_hashed_and_take_effect(blog: BlogFixture) {
        let created = blog.users.signup(draft("a@x.com")).await.expect("signup");
        let patch = UserPatch::try_from_parts(None, None, None, Some("brandNewPass!1"), None)
            .expect("valid patch");
        blog.users.update(created.id, patch).await.expect("update");

        let old = LoginCredentials::try_from_parts("a@x.com", "yahoo!XD123").expect("credentials");
        let new =
            LoginCredentials::try_from_parts("a@x.com", "brandNewPass!1").expect("credentials");
        assert!(blog.users.authenticate(&old).await.is_err());
        let user = blog.users.authenticate(&new).await.expect("new password accepted");
        assert!(!String::from(user.password().clone()).contains("brandNewPass!1"));
    }

    #[rstest]
    #[tokio::test]
    async fn update_merges_only_provided_fields(blog: BlogFixture) {
        let created = blog.users.signup(draft("a@x.com")).await.expect("signup");
        let patch = UserPatch::try_from_parts(Some("new first name"), None, None, None, None)
            .expect("valid patch");

        let updated = blog.users.update(created.id, patch).await.expect("update");
        assert_eq!(updated.first_name, "new first name");
        assert_eq!(updated.last_name, created.last_name);
        assert_eq!(updated.email, created.email);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_twice_reports_false(blog: BlogFixture) {
        let created = blog.users.signup(draft("a@x.com")).await.expect("signup");

        assert!(blog.users.delete(created.id).await.expect("delete"));
        assert!(!blog.users.delete(created.id).await.expect("delete again"));
        let err = blog.users.get_by_id(created.id).await.expect_err("gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
