use crate::error::{BoardError, BoardResult};
use crate::orm::users;
use crate::permission::{load_roles, Roles};
use crate::session::session_user_id;
use actix_session::Session;
use actix_web::dev::Payload;
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::rc::Rc;

/// Client data stored for a single request cycle.
#[derive(Clone, Debug, Default)]
pub struct ClientCtxInner {
    /// User data. Optional. None is a guest user.
    pub client: Option<users::Model>,
    /// Groups and permissions of the user, read for this request only.
    pub roles: Roles,
}

impl ClientCtxInner {
    /// Resolves the session's user and their roles.
    ///
    /// A session pointing at a missing or inactive user is treated as a guest.
    pub async fn from_session(session: &Session, db: &DatabaseConnection) -> BoardResult<Self> {
        let user_id = match session_user_id(session) {
            Some(id) => id,
            None => return Ok(Self::default()),
        };

        let client = match users::Entity::find_by_id(user_id).one(db).await? {
            Some(user) if user.is_active => user,
            Some(_) | None => {
                log::debug!("Session references unavailable user_id={}", user_id);
                return Ok(Self::default());
            }
        };

        let roles = load_roles(db, client.id).await?;

        Ok(Self {
            client: Some(client),
            roles,
        })
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is computed once per request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Rc<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Rc::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    pub fn new(inner: ClientCtxInner) -> Self {
        Self(Rc::new(inner))
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.client.as_ref().map(|u| u.id)
    }

    /// Returns either the user's email or the word for guest.
    pub fn get_name(&self) -> String {
        match &self.0.client {
            Some(user) => user.email.to_owned(),
            None => "Guest".to_owned(),
        }
    }

    pub fn get_user(&self) -> Option<&users::Model> {
        self.0.client.as_ref()
    }

    pub fn get_roles(&self) -> &Roles {
        &self.0.roles
    }

    pub fn is_user(&self) -> bool {
        self.0.client.is_some()
    }

    /// Require user to be logged in. Returns the user or Unauthorized.
    pub fn require_login(&self) -> BoardResult<&users::Model> {
        self.0.client.as_ref().ok_or(BoardError::Unauthorized)
    }

    /// Require a named permission. Returns () or PermissionDenied.
    pub fn require_permission(&self, codename: &str) -> BoardResult<()> {
        self.require_login()?;
        if !self.0.roles.has_permission(codename) {
            return Err(BoardError::PermissionDenied("Insufficient permissions"));
        }
        Ok(())
    }

    /// Require ownership of a resource. Returns () or PermissionDenied.
    pub fn require_ownership(&self, owner_id: i32, message: &'static str) -> BoardResult<()> {
        let user = self.require_login()?;
        if user.id != owner_id {
            return Err(BoardError::PermissionDenied(message));
        }
        Ok(())
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
///
/// The context is stored in the request extensions, so several extractors in
/// one handler share a single lookup.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(ctx) = req.extensions().get::<ClientCtx>() {
            let ctx = ctx.clone();
            return Box::pin(async move { Ok(ctx) });
        }

        let req = req.clone();
        let session = Session::extract(&req).into_inner();
        let db = req.app_data::<Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            let db = db.ok_or_else(|| {
                actix_web::error::ErrorServiceUnavailable("Database is not configured.")
            })?;
            let session = session?;

            let ctx = ClientCtx::new(ClientCtxInner::from_session(&session, &db).await?);
            req.extensions_mut().insert(ctx.clone());
            Ok(ctx)
        })
    }
}
