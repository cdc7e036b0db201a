// ============================================================================
// SESSION STATE - Sesión autenticada + verificación en dos pasos
// ============================================================================
// Anonymous ──login──▶ Authenticated
// Anonymous ──login(verify)──▶ AwaitingCode ──verify_code──▶ Authenticated
// AwaitingCode ──login──▶ AwaitingCode (descarta el userId pendiente)
// Authenticated ──logout | 401──▶ Anonymous
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, RegisterRequest, Role, VerifyCodeRequest};
use crate::services::{ApiClient, HttpTransport};
use crate::state::reactivity::Subscribers;
use crate::utils::{
    validate_password, KeyValueStorage, STORAGE_KEY_PENDING_USER_ID, STORAGE_KEY_ROLE, STORAGE_KEY_TOKEN,
    STORAGE_KEY_USER_ID,
};

/// Identidad autenticada. `role` solo tiene sentido si hay `token`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role.map_or(false, |r| r.is_admin())
    }
}

/// Puente entre el login y el código de verificación
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    AwaitingCode,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { role: Option<Role> },
    VerificationRequired { user_id: String },
    LoggedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated,
    VerificationRequired { user_id: String, message: Option<String> },
    Failed(AppError),
}

impl LoginOutcome {
    /// Forma que consume la vista de login
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            LoginOutcome::Authenticated => json!({ "success": true }),
            LoginOutcome::VerificationRequired { user_id, message } => {
                json!({ "step": "verify", "userId": user_id, "message": message })
            }
            LoginOutcome::Failed(error) => json!({ "success": false, "error": error.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Authenticated,
    Failed(AppError),
}

impl VerifyOutcome {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            VerifyOutcome::Authenticated => json!({ "success": true }),
            VerifyOutcome::Failed(error) => json!({ "success": false, "error": error.to_string() }),
        }
    }
}

struct SessionInner {
    session: Session,
    pending: Option<PendingVerification>,
    // Cambia con cada cambio de identidad o intento de login; una respuesta
    // que llega con otra época se descarta.
    epoch: u64,
}

/// Estado de sesión compartido (Rc<RefCell>); los clones ven el mismo estado
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<RefCell<SessionInner>>,
    storage: Rc<dyn KeyValueStorage>,
    subscribers: Subscribers<SessionEvent>,
}

const STALE_RESPONSE: &str = "la sesión cambió mientras la solicitud estaba en curso";

impl SessionStore {
    /// Sesión vacía, sin leer el storage
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SessionInner {
                session: Session::default(),
                pending: None,
                epoch: 0,
            })),
            storage,
            subscribers: Subscribers::new(),
        }
    }

    /// Restaura token/rol (o la verificación pendiente) desde el storage.
    /// No se valida el token contra el servidor: el primer 401 lo invalida.
    pub fn restore(storage: Rc<dyn KeyValueStorage>) -> Self {
        let token = read_non_empty(storage.as_ref(), STORAGE_KEY_TOKEN);
        let store = Self::new(storage);

        {
            let mut inner = store.inner.borrow_mut();
            match token {
                Some(token) => {
                    inner.session = Session {
                        token: Some(token),
                        user_id: read_non_empty(store.storage.as_ref(), STORAGE_KEY_USER_ID),
                        role: read_non_empty(store.storage.as_ref(), STORAGE_KEY_ROLE).and_then(|r| r.parse().ok()),
                    };
                    // Un userId pendiente junto a un token es residuo de otro flujo
                    store.storage.remove(STORAGE_KEY_PENDING_USER_ID);
                    log::info!("💾 Sesión restaurada desde storage (rol: {:?})", inner.session.role);
                }
                None => {
                    inner.pending = read_non_empty(store.storage.as_ref(), STORAGE_KEY_PENDING_USER_ID)
                        .map(|user_id| PendingVerification { user_id });
                    if inner.pending.is_some() {
                        log::info!("💾 Verificación pendiente restaurada desde storage");
                    }
                }
            }
        }

        store
    }

    pub fn snapshot(&self) -> Session {
        self.inner.borrow().session.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.borrow().session.token.clone()
    }

    pub fn role(&self) -> Option<Role> {
        let inner = self.inner.borrow();
        inner.session.token.as_ref().and(inner.session.role)
    }

    pub fn user_id(&self) -> Option<String> {
        self.inner.borrow().session.user_id.clone()
    }

    pub fn pending(&self) -> Option<PendingVerification> {
        self.inner.borrow().pending.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().session.is_authenticated()
    }

    pub fn status(&self) -> AuthStatus {
        let inner = self.inner.borrow();
        if inner.session.is_authenticated() {
            AuthStatus::Authenticated
        } else if inner.pending.is_some() {
            AuthStatus::AwaitingCode
        } else {
            AuthStatus::Anonymous
        }
    }

    /// Suscribirse a cambios de sesión (login, verificación pedida, logout)
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&SessionEvent) + 'static,
    {
        self.subscribers.subscribe(callback);
    }

    /// Login con usuario y contraseña. Nunca reintenta.
    pub async fn login<T: HttpTransport>(&self, api: &ApiClient<T>, usuario: &str, contrasena: &str) -> LoginOutcome {
        log::info!("🔐 Iniciando login para usuario: {}", usuario);
        let epoch = self.begin_attempt();

        let request = LoginRequest {
            usuario: usuario.to_string(),
            contrasena: contrasena.to_string(),
        };

        let response = match api.login(&request).await {
            Ok(response) => response,
            Err(err) => {
                let err = auth_failure(err, "Error en login");
                log::warn!("❌ Login fallido: {}", err);
                return LoginOutcome::Failed(err);
            }
        };

        if self.epoch() != epoch {
            log::warn!("⚠️ Respuesta de login descartada: {}", STALE_RESPONSE);
            return LoginOutcome::Failed(AppError::InvalidState(STALE_RESPONSE.to_string()));
        }

        if response.requires_verification() {
            let Some(user_id) = response.user_id.clone() else {
                return LoginOutcome::Failed(AppError::Authentication(
                    "Respuesta de verificación sin userId".to_string(),
                ));
            };
            self.set_pending(user_id.clone());
            log::info!("📨 Login requiere código de verificación");
            return LoginOutcome::VerificationRequired {
                user_id,
                message: response.message,
            };
        }

        let role = response.role();
        match response.token {
            Some(token) if !token.is_empty() => {
                self.apply_authenticated(token, response.usuario, role);
                log::info!("✅ Login exitoso (rol: {:?})", role);
                LoginOutcome::Authenticated
            }
            _ => LoginOutcome::Failed(AppError::Authentication("Respuesta de login sin token".to_string())),
        }
    }

    /// Envía el código de verificación. Sin verificación pendiente → `InvalidState`.
    /// Un código incorrecto conserva el pendiente para reintentar.
    pub async fn verify_code<T: HttpTransport>(&self, api: &ApiClient<T>, code: &str) -> AppResult<VerifyOutcome> {
        let pending = self
            .pending()
            .ok_or_else(|| AppError::InvalidState("No hay una verificación pendiente".to_string()))?;
        let epoch = self.epoch();

        log::info!("🔑 Verificando código");
        let request = VerifyCodeRequest {
            user_id: pending.user_id.clone(),
            code: code.trim().to_string(),
        };

        let response = match api.verify_code(&request).await {
            Ok(response) => response,
            Err(err) => return Ok(VerifyOutcome::Failed(auth_failure(err, "Error al verificar código"))),
        };

        if !response.success {
            let error = response.error.unwrap_or_else(|| "Código inválido".to_string());
            log::warn!("❌ Código rechazado: {}", error);
            return Ok(VerifyOutcome::Failed(AppError::Authentication(error)));
        }

        if self.epoch() != epoch || self.pending().as_ref() != Some(&pending) {
            log::warn!("⚠️ Respuesta de verificación descartada: {}", STALE_RESPONSE);
            return Err(AppError::InvalidState(STALE_RESPONSE.to_string()));
        }

        let role = response.role();
        let Some(token) = response.token.filter(|t| !t.is_empty()) else {
            return Ok(VerifyOutcome::Failed(AppError::Authentication(
                "Respuesta de verificación sin token".to_string(),
            )));
        };
        let user_id = response.usuario.or(Some(pending.user_id));
        self.apply_authenticated(token, user_id, role);
        log::info!("✅ Código verificado (rol: {:?})", role);
        Ok(VerifyOutcome::Authenticated)
    }

    /// Alta de usuario. La política de contraseña se valida antes de enviar.
    pub async fn register<T: HttpTransport>(&self, api: &ApiClient<T>, form: &RegisterRequest) -> AppResult<String> {
        validate_password(&form.contrasena)?;
        match api.register(form).await {
            Ok(()) => {
                log::info!("👤 Usuario {} registrado", form.usuario);
                Ok("Usuario creado exitosamente".to_string())
            }
            Err(err) if err.is_client_error() => Err(AppError::Validation(
                err.server_message().unwrap_or("Error en registro").to_string(),
            )),
            Err(err) => Err(err),
        }
    }

    /// Cierra la sesión en memoria y en storage. Sin sesión es un no-op.
    pub fn logout(&self) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if !inner.session.is_authenticated() && inner.pending.is_none() {
                false
            } else {
                inner.session = Session::default();
                inner.pending = None;
                inner.epoch += 1;
                true
            }
        };

        for key in [STORAGE_KEY_TOKEN, STORAGE_KEY_ROLE, STORAGE_KEY_USER_ID, STORAGE_KEY_PENDING_USER_ID] {
            self.storage.remove(key);
        }

        if changed {
            log::info!("👋 Logout - sesión cerrada");
            self.subscribers.notify(&SessionEvent::LoggedOut);
        }
    }

    /// Llamado por el gateway ante un 401: cierra la sesión solo si el token
    /// rechazado sigue siendo el actual.
    pub fn expire_token(&self, token: &str) -> bool {
        if self.token().as_deref() != Some(token) {
            log::info!("ℹ️ 401 de una sesión anterior, se ignora");
            return false;
        }
        log::warn!("🔒 Token expirado o inválido, cerrando sesión");
        self.logout();
        true
    }

    pub(crate) fn apply_authenticated(&self, token: String, user_id: Option<String>, role: Option<Role>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.session = Session {
                token: Some(token.clone()),
                user_id: user_id.clone(),
                role,
            };
            inner.pending = None;
            inner.epoch += 1;
        }

        self.persist(STORAGE_KEY_TOKEN, Some(&token));
        self.persist(STORAGE_KEY_ROLE, role.map(|r| r.as_str()));
        self.persist(STORAGE_KEY_USER_ID, user_id.as_deref());
        self.storage.remove(STORAGE_KEY_PENDING_USER_ID);

        self.subscribers.notify(&SessionEvent::LoggedIn { role });
    }

    fn set_pending(&self, user_id: String) {
        self.inner.borrow_mut().pending = Some(PendingVerification {
            user_id: user_id.clone(),
        });
        self.persist(STORAGE_KEY_PENDING_USER_ID, Some(&user_id));
        self.subscribers.notify(&SessionEvent::VerificationRequired { user_id });
    }

    /// Nuevo intento de login: descarta el pendiente anterior
    fn begin_attempt(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.pending = None;
        inner.epoch += 1;
        self.storage.remove(STORAGE_KEY_PENDING_USER_ID);
        inner.epoch
    }

    fn epoch(&self) -> u64 {
        self.inner.borrow().epoch
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                if let Err(e) = self.storage.set(key, value) {
                    log::warn!("⚠️ No se pudo guardar {} en storage: {}", key, e);
                }
            }
            None => self.storage.remove(key),
        }
    }
}

fn read_non_empty(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    storage.get(key).filter(|v| !v.trim().is_empty())
}

/// Fallos de autenticación: los 4xx se muestran con el texto del servidor
fn auth_failure(err: AppError, default_message: &str) -> AppError {
    if err.is_client_error() {
        return AppError::Authentication(err.server_message().unwrap_or(default_message).to_string());
    }
    match err {
        AppError::Http { message, .. } => AppError::Transport(message.unwrap_or_else(|| default_message.to_string())),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::mock::MockTransport;
    use crate::utils::MemoryStorage;
    use std::cell::RefCell as StdRefCell;

    struct Fixture {
        session: SessionStore,
        api: ApiClient<MockTransport>,
        transport: Rc<MockTransport>,
        storage: Rc<MemoryStorage>,
    }

    fn fixture_with(storage: MemoryStorage) -> Fixture {
        let storage = Rc::new(storage);
        let session = SessionStore::restore(storage.clone());
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new("http://api.test", transport.clone(), session.clone());
        Fixture { session, api, transport, storage }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStorage::new())
    }

    #[tokio::test]
    async fn login_without_two_factor_authenticates() {
        let f = fixture();
        f.transport.respond(200, json!({"token": "tok", "usuario": 3, "rol": "admin"}));

        let outcome = f.session.login(&f.api, "ana", "Secreta123").await;

        assert_eq!(outcome, LoginOutcome::Authenticated);
        assert_eq!(outcome.to_json(), json!({"success": true}));
        assert_eq!(f.session.status(), AuthStatus::Authenticated);
        assert_eq!(f.session.role(), Some(Role::Admin));
        assert_eq!(f.storage.get("token").as_deref(), Some("tok"));
        assert_eq!(f.storage.get("role").as_deref(), Some("admin"));
        assert_eq!(f.storage.get("usuario").as_deref(), Some("3"));

        let request = f.transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/auth/login");
        assert_eq!(f.transport.last_body().unwrap(), json!({"usuario": "ana", "contrasena": "Secreta123"}));
    }

    #[tokio::test]
    async fn login_requiring_verification_stays_anonymous() {
        let f = fixture();
        f.transport.respond(200, json!({"step": "verify", "userId": 42, "message": "Código enviado"}));

        let outcome = f.session.login(&f.api, "ana", "Secreta123").await;

        assert_eq!(
            outcome,
            LoginOutcome::VerificationRequired {
                user_id: "42".into(),
                message: Some("Código enviado".into())
            }
        );
        assert_eq!(outcome.to_json()["step"], "verify");
        assert!(!f.session.is_authenticated());
        assert_eq!(f.session.status(), AuthStatus::AwaitingCode);
        assert_eq!(f.session.pending(), Some(PendingVerification { user_id: "42".into() }));
        assert_eq!(f.storage.get("pendingUserId").as_deref(), Some("42"));
        assert_eq!(f.storage.get("token"), None);
    }

    #[tokio::test]
    async fn bad_credentials_fail_without_touching_session() {
        let f = fixture();
        f.transport.respond(401, json!({"error": "Credenciales incorrectas"}));

        let outcome = f.session.login(&f.api, "a", "bad").await;

        assert_eq!(
            outcome,
            LoginOutcome::Failed(AppError::Authentication("Credenciales incorrectas".into()))
        );
        assert_eq!(
            outcome.to_json(),
            json!({"success": false, "error": "Credenciales incorrectas"})
        );
        assert_eq!(f.session.status(), AuthStatus::Anonymous);
    }

    #[tokio::test]
    async fn login_failure_without_message_uses_default() {
        let f = fixture();
        f.transport.respond_empty(400);
        f.transport.fail("Network error: offline");

        let outcome = f.session.login(&f.api, "a", "b").await;
        assert_eq!(outcome, LoginOutcome::Failed(AppError::Authentication("Error en login".into())));

        let outcome = f.session.login(&f.api, "a", "b").await;
        assert!(matches!(outcome, LoginOutcome::Failed(AppError::Transport(_))));
    }

    #[tokio::test]
    async fn verify_without_pending_is_invalid_state() {
        let f = fixture();
        let err = f.session.verify_code(&f.api, "123456").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn verify_success_authenticates_and_clears_pending() {
        let f = fixture();
        f.transport
            .respond(200, json!({"step": "verify", "userId": "42"}))
            .respond(200, json!({"success": true, "token": "tok-2fa", "usuario": "42", "rol": "empleado"}));

        f.session.login(&f.api, "ana", "Secreta123").await;
        let outcome = f.session.verify_code(&f.api, " 123456 ").await.unwrap();

        assert_eq!(outcome, VerifyOutcome::Authenticated);
        assert_eq!(f.transport.last_body().unwrap(), json!({"userId": "42", "code": "123456"}));
        assert_eq!(f.session.status(), AuthStatus::Authenticated);
        assert_eq!(f.session.role(), Some(Role::Empleado));
        assert_eq!(f.session.pending(), None);
        assert_eq!(f.storage.get("pendingUserId"), None);
        assert_eq!(f.storage.get("token").as_deref(), Some("tok-2fa"));
    }

    #[tokio::test]
    async fn wrong_code_keeps_pending_for_retry() {
        let f = fixture();
        f.transport
            .respond(200, json!({"step": "verify", "userId": "42"}))
            .respond(200, json!({"success": false, "error": "Código expirado"}))
            .respond(400, json!({}));

        f.session.login(&f.api, "ana", "Secreta123").await;

        let outcome = f.session.verify_code(&f.api, "000000").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Failed(AppError::Authentication("Código expirado".into())));
        assert_eq!(f.session.status(), AuthStatus::AwaitingCode);

        let outcome = f.session.verify_code(&f.api, "000001").await.unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::Failed(AppError::Authentication("Error al verificar código".into()))
        );
        assert_eq!(f.session.pending().unwrap().user_id, "42");
    }

    #[tokio::test]
    async fn new_login_discards_previous_pending() {
        let f = fixture();
        f.transport
            .respond(200, json!({"step": "verify", "userId": "1"}))
            .respond(200, json!({"step": "verify", "userId": "2"}));

        f.session.login(&f.api, "a", "x").await;
        f.session.login(&f.api, "b", "y").await;

        assert_eq!(f.session.status(), AuthStatus::AwaitingCode);
        assert_eq!(f.session.pending().unwrap().user_id, "2");
        assert_eq!(f.storage.get("pendingUserId").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn failed_login_after_pending_returns_to_anonymous() {
        let f = fixture();
        f.transport
            .respond(200, json!({"step": "verify", "userId": "1"}))
            .respond(401, json!({"error": "Credenciales incorrectas"}));

        f.session.login(&f.api, "a", "x").await;
        f.session.login(&f.api, "a", "bad").await;

        assert_eq!(f.session.status(), AuthStatus::Anonymous);
        assert_eq!(f.storage.get("pendingUserId"), None);
    }

    #[test]
    fn restore_reads_token_and_role() {
        let storage = MemoryStorage::with_entries([("token", "t"), ("role", "admin"), ("usuario", "7")]);
        let f = fixture_with(storage);
        assert_eq!(f.session.status(), AuthStatus::Authenticated);
        assert_eq!(
            f.session.snapshot(),
            Session { token: Some("t".into()), user_id: Some("7".into()), role: Some(Role::Admin) }
        );
        assert!(f.session.snapshot().is_admin());
    }

    #[test]
    fn restore_pending_verification() {
        let f = fixture_with(MemoryStorage::with_entries([("pendingUserId", "42")]));
        assert_eq!(f.session.status(), AuthStatus::AwaitingCode);
    }

    #[test]
    fn restore_ignores_role_without_token() {
        let f = fixture_with(MemoryStorage::with_entries([("role", "admin")]));
        assert_eq!(f.session.status(), AuthStatus::Anonymous);
        assert_eq!(f.session.role(), None);
    }

    #[test]
    fn logout_clears_everything_and_is_idempotent() {
        let f = fixture_with(MemoryStorage::with_entries([("token", "t"), ("role", "admin"), ("usuario", "7")]));
        let events = Rc::new(StdRefCell::new(Vec::new()));
        {
            let events = Rc::clone(&events);
            f.session.subscribe(move |e| events.borrow_mut().push(e.clone()));
        }

        f.session.logout();
        f.session.logout();

        assert_eq!(f.session.snapshot(), Session::default());
        assert!(!f.storage.contains("token"));
        assert!(!f.storage.contains("role"));
        assert!(!f.storage.contains("usuario"));
        assert_eq!(*events.borrow(), vec![SessionEvent::LoggedOut]);
    }

    #[test]
    fn expire_token_only_for_current_token() {
        let f = fixture_with(MemoryStorage::with_entries([("token", "t")]));
        assert!(!f.session.expire_token("viejo"));
        assert!(f.session.is_authenticated());
        assert!(f.session.expire_token("t"));
        assert!(!f.session.is_authenticated());
    }

    /// Transporte que cierra la sesión mientras la request de login está en vuelo
    struct LogoutDuringRequest {
        session: SessionStore,
    }

    impl HttpTransport for LogoutDuringRequest {
        async fn send(&self, _request: crate::services::HttpRequest) -> Result<crate::services::HttpResponse, String> {
            self.session.apply_authenticated("otro".into(), None, None);
            self.session.logout();
            Ok(crate::services::HttpResponse {
                status: 200,
                body: json!({"token": "tardio", "rol": "admin"}).to_string(),
            })
        }
    }

    #[tokio::test]
    async fn stale_login_response_is_discarded() {
        let storage: Rc<MemoryStorage> = Rc::new(MemoryStorage::new());
        let session = SessionStore::new(storage.clone());
        let api = ApiClient::new(
            "http://api.test",
            Rc::new(LogoutDuringRequest { session: session.clone() }),
            session.clone(),
        );

        let outcome = session.login(&api, "ana", "Secreta123").await;

        assert!(matches!(outcome, LoginOutcome::Failed(AppError::InvalidState(_))));
        assert!(!session.is_authenticated());
        assert_eq!(storage.get("token"), None);
    }

    /// Transporte que cierra la sesión mientras se verifica el código
    struct LogoutDuringVerify {
        session: SessionStore,
    }

    impl HttpTransport for LogoutDuringVerify {
        async fn send(&self, _request: crate::services::HttpRequest) -> Result<crate::services::HttpResponse, String> {
            self.session.logout();
            Ok(crate::services::HttpResponse {
                status: 200,
                body: json!({"success": true, "token": "tardio", "usuario": "42", "rol": "admin"}).to_string(),
            })
        }
    }

    #[tokio::test]
    async fn stale_verify_response_is_discarded() {
        let storage = Rc::new(MemoryStorage::with_entries([("pendingUserId", "42")]));
        let session = SessionStore::restore(storage.clone());
        assert_eq!(session.status(), AuthStatus::AwaitingCode);
        let api = ApiClient::new(
            "http://api.test",
            Rc::new(LogoutDuringVerify { session: session.clone() }),
            session.clone(),
        );

        let result = session.verify_code(&api, "123456").await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
        assert!(!session.is_authenticated());
        assert_eq!(session.status(), AuthStatus::Anonymous);
        assert_eq!(storage.get("token"), None);
        assert_eq!(storage.get("role"), None);
    }

    #[test]
    fn logout_while_awaiting_code_clears_pending() {
        let f = fixture_with(MemoryStorage::with_entries([("pendingUserId", "42")]));
        assert_eq!(f.session.status(), AuthStatus::AwaitingCode);
        let events = Rc::new(StdRefCell::new(Vec::new()));
        {
            let events = Rc::clone(&events);
            f.session.subscribe(move |e| events.borrow_mut().push(e.clone()));
        }

        f.session.logout();

        assert_eq!(f.session.status(), AuthStatus::Anonymous);
        assert_eq!(f.session.pending(), None);
        assert!(!f.storage.contains("pendingUserId"));
        assert_eq!(*events.borrow(), vec![SessionEvent::LoggedOut]);
    }

    #[tokio::test]
    async fn register_validates_password_first() {
        let f = fixture();
        let form = RegisterRequest {
            nombre: "Ana".into(),
            usuario: "ana".into(),
            correo: "ana@tienda.pe".into(),
            contrasena: "corta".into(),
            rol: Role::Empleado,
        };

        let err = f.session.register(&f.api, &form).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(f.transport.requests().is_empty());

        let form = RegisterRequest { contrasena: "Secreta123".into(), ..form };
        f.transport
            .respond(201, json!({"id": 9}))
            .respond(400, json!({"message": "Usuario ya existe"}));
        assert_eq!(
            f.session.register(&f.api, &form).await.unwrap(),
            "Usuario creado exitosamente"
        );
        assert_eq!(
            f.session.register(&f.api, &form).await.unwrap_err(),
            AppError::Validation("Usuario ya existe".into())
        );
    }
}
