/*
 * Responsibility
 * - API prefix 配下への Bearer API key 検証 (ヘッダ抽出 → 検証 → 拒否)
 * - Router 全体に掛けるので、route 単位で外すことはできない
 * - prefix 外 (/, /health など) は素通し
 */
//! `Authorization: Bearer <api-key>` を `API_KEYS` と照合する edge gate。
//!
//! 拒否時は handler に到達せず、401 + `WWW-Authenticate: Bearer` を返す。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Router 全体に API key gate を適用する。
///
/// route/nest を全て登録した後に呼ぶこと (layer は登録済みの route と fallback にだけ掛かる)。
///
/// 例：
/// ```ignore
/// let router = Router::new().nest("/api", api::routes()).fallback(not_found);
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !req.uri().path().starts_with(&*state.api_prefix) {
        return Ok(next.run(req).await);
    }

    // 非 ASCII などで文字列化できないヘッダは「存在するが不正」として扱う
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    if let Err(rejection) = state.auth.authenticate(auth) {
        tracing::warn!(
            reason = rejection.as_str(),
            method = %req.method(),
            path = %req.uri().path(),
            "api key authentication failed"
        );
        return Err(rejection.into());
    }

    Ok(next.run(req).await)
}
