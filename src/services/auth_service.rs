use crate::error::AppResult;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, VerifyCodeRequest, VerifyCodeResponse};
use crate::services::api_client::ApiClient;
use crate::services::http::{HttpTransport, Method};

/// Endpoints de autenticación. El estado de sesión lo maneja SessionStore.
impl<T: HttpTransport> ApiClient<T> {
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        self.send_json(Method::Post, "/auth/login", request).await
    }

    pub async fn verify_code(&self, request: &VerifyCodeRequest) -> AppResult<VerifyCodeResponse> {
        self.send_json(Method::Post, "/auth/verify-code", request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        self.send_unit(Method::Post, "/auth/register", request).await
    }
}
