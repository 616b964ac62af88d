//! # Account Service
//!
//! Sign-up, sign-in, profile updates and sign-out against the backend, with
//! the signed-in user persisted in the host [`SettingsStore`] under
//! [`USER_KEY`].
//!
//! Signing out stops the shared playback session. Passwords are never
//! logged; emails only in redacted form.

use crate::api::{backend_error, endpoint, success_message};
use crate::error::{CoreError, Result};
use crate::types::{Credentials, ProfileUpdate, SignInResponse, User};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::SettingsStore;
use core_playback::PlaybackSession;
use core_runtime::events::{AccountEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Settings key holding the signed-in user as JSON.
pub const USER_KEY: &str = "user";

pub struct AccountService {
    http_client: Arc<dyn HttpClient>,
    settings: Arc<dyn SettingsStore>,
    base_url: Url,
    events: EventBus,
    session: PlaybackSession,
}

impl AccountService {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        settings: Arc<dyn SettingsStore>,
        base_url: Url,
        events: EventBus,
        session: PlaybackSession,
    ) -> Self {
        Self {
            http_client,
            settings,
            base_url,
            events,
            session,
        }
    }

    /// Registers a new account. Returns the server's confirmation message.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", email)))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        let credentials = validate_credentials(email, password)?;
        let url = endpoint(&self.base_url, &["signup"])?;
        let request = HttpRequest::new(HttpMethod::Post, url.as_str()).json(&credentials)?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            let err = backend_error(&response);
            warn!(status = response.status, error = %err, "Sign-up rejected");
            return Err(err);
        }

        info!("Account created");
        self.emit(AccountEvent::SignedUp {
            email: credentials.email.to_string(),
        });
        Ok(success_message(&response).unwrap_or_else(|| "Account created".to_string()))
    }

    /// Signs in and persists the returned user.
    #[instrument(skip_all, fields(email = %redact_if_sensitive("email", email)))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let credentials = validate_credentials(email, password)?;
        let url = endpoint(&self.base_url, &["signin"])?;
        let request = HttpRequest::new(HttpMethod::Post, url.as_str()).json(&credentials)?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            let err = backend_error(&response);
            warn!(status = response.status, error = %err, "Sign-in rejected");
            if let CoreError::Backend { message, .. } = &err {
                self.emit(AccountEvent::SignInFailed {
                    message: message.clone(),
                });
            }
            return Err(err);
        }

        let SignInResponse { user } = response.json::<SignInResponse>()?;
        self.persist(&user).await?;

        info!(user_id = %user.id, "Signed in");
        self.emit(AccountEvent::SignedIn {
            user_id: user.id.clone(),
        });
        Ok(user)
    }

    /// The persisted user, if anyone is signed in.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.settings.get_string(USER_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CoreError::Storage(format!("Persisted user is not valid JSON: {}", e)))
    }

    /// Updates the signed-in user's name and bio.
    #[instrument(skip(self, bio))]
    pub async fn update_profile(&self, name: &str, bio: &str) -> Result<User> {
        let mut user = self.current_user().await?.ok_or(CoreError::NotSignedIn)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Name cannot be empty".to_string()));
        }

        let url = endpoint(&self.base_url, &["update", &user.id])?;
        let request =
            HttpRequest::new(HttpMethod::Put, url.as_str()).json(&ProfileUpdate { name, bio })?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            let err = backend_error(&response);
            warn!(user_id = %user.id, status = response.status, error = %err, "Profile update rejected");
            return Err(err);
        }

        user.name = name.to_string();
        user.bio = Some(bio.to_string());
        self.persist(&user).await?;

        info!(user_id = %user.id, "Profile updated");
        self.emit(AccountEvent::ProfileUpdated {
            user_id: user.id.clone(),
        });
        Ok(user)
    }

    /// Forgets the persisted user and stops playback.
    ///
    /// A corrupt persisted user does not block signing out.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let user_id = match self.current_user().await {
            Ok(user) => user.map(|u| u.id),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable user record");
                None
            }
        };

        self.settings.delete(USER_KEY).await?;
        self.session.stop().await;

        info!(user_id = ?user_id, "Signed out");
        self.emit(AccountEvent::SignedOut { user_id });
        Ok(())
    }

    async fn persist(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)
            .map_err(|e| CoreError::Storage(format!("Failed to encode user: {}", e)))?;
        self.settings.set_string(USER_KEY, &json).await?;
        debug!(user_id = %user.id, "Persisted user");
        Ok(())
    }

    fn emit(&self, event: AccountEvent) {
        let _ = self.events.emit(CoreEvent::Account(event));
    }
}

fn validate_credentials<'a>(email: &'a str, password: &'a str) -> Result<Credentials<'a>> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(CoreError::InvalidInput(
            "A valid email address is required".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(CoreError::InvalidInput("Password is required".to_string()));
    }
    Ok(Credentials { email, password })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpResponse, RetryPolicy};
    use bridge_traits::playback::{
        HandleId, PlaybackAdapter, PlaybackRequest, PlaybackStatusListener,
    };
    use bytes::Bytes;
    use core_playback::{HttpAudioSourceResolver, PlaybackPhase, Track};
    use core_runtime::config::PlaybackConfig;
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::Mutex;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> BridgeResult<HttpResponse>;
        }
    }

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl SettingsStore for MemoryStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.0.lock().unwrap().keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
    }

    struct SilentAdapter;

    #[async_trait]
    impl PlaybackAdapter for SilentAdapter {
        async fn load(
            &self,
            _request: PlaybackRequest,
            _listener: Arc<dyn PlaybackStatusListener>,
        ) -> BridgeResult<HandleId> {
            Ok(HandleId::new())
        }

        async fn play(&self, _handle: HandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn pause(&self, _handle: HandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn stop(&self, _handle: HandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn unload(&self, _handle: HandleId) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn respond(status: u16, body: &str) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    struct Fixture {
        account: AccountService,
        store: Arc<MemoryStore>,
        session: PlaybackSession,
        events: core_async::sync::broadcast::Receiver<CoreEvent>,
    }

    fn fixture(mock_http: MockHttpClient) -> Fixture {
        let base = Url::parse("http://10.0.2.2:3000").unwrap();
        let bus = EventBus::new(32);
        let events = bus.subscribe();
        let session = PlaybackSession::new(
            Arc::new(SilentAdapter),
            Arc::new(HttpAudioSourceResolver::from_url(base.clone()).unwrap()),
            PlaybackConfig::default(),
            bus.clone(),
        )
        .unwrap();
        let store = Arc::new(MemoryStore::default());
        let account = AccountService::new(
            Arc::new(mock_http),
            store.clone(),
            base,
            bus,
            session.clone(),
        );
        Fixture {
            account,
            store,
            session,
            events,
        }
    }

    fn account_events(rx: &mut core_async::sync::broadcast::Receiver<CoreEvent>) -> Vec<AccountEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let CoreEvent::Account(event) = event {
                out.push(event);
            }
        }
        out
    }

    const SIGNED_IN: &str = r#"{
        "message": "Login successful",
        "user": { "id": "66f0c1", "email": "asha@example.com", "name": "Asha" }
    }"#;

    #[core_async::test]
    async fn sign_up_posts_credentials() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| {
                let body: serde_json::Value =
                    serde_json::from_slice(req.body.as_deref().unwrap_or_default()).unwrap();
                req.method == HttpMethod::Post
                    && req.url == "http://10.0.2.2:3000/signup"
                    && body["email"] == "asha@example.com"
                    && body["password"] == "s3cret"
            })
            .times(1)
            .returning(|_| respond(201, r#"{ "message": "User created successfully" }"#));

        let mut f = fixture(mock_http);
        let message = f.account.sign_up(" asha@example.com ", "s3cret").await.unwrap();

        assert_eq!(message, "User created successfully");
        assert!(matches!(
            account_events(&mut f.events).as_slice(),
            [AccountEvent::SignedUp { email }] if email == "asha@example.com"
        ));
    }

    #[core_async::test]
    async fn sign_up_surfaces_server_message() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(400, r#"{ "message": "User already exists" }"#));

        let f = fixture(mock_http);
        let err = f.account.sign_up("asha@example.com", "pw").await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::Backend { status: 400, ref message } if message == "User already exists"
        ));
    }

    #[core_async::test]
    async fn invalid_credentials_never_reach_backend() {
        let f = fixture(MockHttpClient::new());

        assert!(matches!(
            f.account.sign_in("not-an-email", "pw").await,
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            f.account.sign_up("asha@example.com", "").await,
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[core_async::test]
    async fn sign_in_persists_user() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url == "http://10.0.2.2:3000/signin")
            .returning(|_| respond(200, SIGNED_IN));

        let mut f = fixture(mock_http);
        let user = f.account.sign_in("asha@example.com", "pw").await.unwrap();

        assert_eq!(user.id, "66f0c1");
        assert_eq!(f.account.current_user().await.unwrap(), Some(user));
        assert!(f.store.0.lock().unwrap().contains_key(USER_KEY));
        assert!(matches!(
            account_events(&mut f.events).as_slice(),
            [AccountEvent::SignedIn { user_id }] if user_id == "66f0c1"
        ));
    }

    #[core_async::test]
    async fn failed_sign_in_keeps_store_clean() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(400, r#"{ "message": "Invalid password" }"#));

        let mut f = fixture(mock_http);
        let err = f.account.sign_in("asha@example.com", "wrong").await.unwrap_err();

        assert!(matches!(err, CoreError::Backend { .. }));
        assert_eq!(f.account.current_user().await.unwrap(), None);
        assert!(matches!(
            account_events(&mut f.events).as_slice(),
            [AccountEvent::SignInFailed { message }] if message == "Invalid password"
        ));
    }

    #[core_async::test]
    async fn corrupt_user_record_is_storage_error() {
        let f = fixture(MockHttpClient::new());
        f.store.set_string(USER_KEY, "{not json").await.unwrap();

        assert!(matches!(
            f.account.current_user().await,
            Err(CoreError::Storage(_))
        ));
    }

    #[core_async::test]
    async fn update_profile_requires_sign_in() {
        let f = fixture(MockHttpClient::new());

        assert!(matches!(
            f.account.update_profile("Asha", "hello").await,
            Err(CoreError::NotSignedIn)
        ));
    }

    #[core_async::test]
    async fn update_profile_uses_persisted_id() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url.ends_with("/signin"))
            .returning(|_| respond(200, SIGNED_IN));
        mock_http
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Put && req.url == "http://10.0.2.2:3000/update/66f0c1"
            })
            .times(1)
            .returning(|_| respond(200, r#"{ "message": "Profile updated" }"#));

        let f = fixture(mock_http);
        f.account.sign_in("asha@example.com", "pw").await.unwrap();
        let user = f.account.update_profile("Asha R", "Loves ghazals").await.unwrap();

        assert_eq!(user.name, "Asha R");
        assert_eq!(user.bio.as_deref(), Some("Loves ghazals"));
        let stored = f.account.current_user().await.unwrap().unwrap();
        assert_eq!(stored.name, "Asha R");
    }

    #[core_async::test]
    async fn sign_out_clears_user_and_stops_playback() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(200, SIGNED_IN));

        let mut f = fixture(mock_http);
        f.account.sign_in("asha@example.com", "pw").await.unwrap();
        f.session.play(&Track::from_filename("a.mp3")).await;
        assert_eq!(f.session.phase(), PlaybackPhase::Playing);

        f.account.sign_out().await.unwrap();

        assert_eq!(f.account.current_user().await.unwrap(), None);
        assert_eq!(f.session.phase(), PlaybackPhase::Idle);
        assert!(matches!(
            account_events(&mut f.events).last(),
            Some(AccountEvent::SignedOut { user_id: Some(id) }) if id == "66f0c1"
        ));
    }

    #[core_async::test]
    async fn sign_out_tolerates_corrupt_record() {
        let f = fixture(MockHttpClient::new());
        f.store.set_string(USER_KEY, "garbage").await.unwrap();

        f.account.sign_out().await.unwrap();
        assert!(!f.store.0.lock().unwrap().contains_key(USER_KEY));
    }
}
