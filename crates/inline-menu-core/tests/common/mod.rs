//! Recording fakes for the coordinator's collaborators.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use inline_menu_core::{Collaborators, CommandRouter, Coordinator, CoordinatorSettings};
use inline_menu_protocols::{
    AuthStatus, AuthStatusProvider, AutofillService, CredentialProvider, CredentialType,
    CredentialView, FillRequest, FrameDetails, FrameError, FrameId, FrameMessenger, FrameRequest,
    LoginView, MessageSender, PortId, ProviderError, SettingsProvider, SurfaceCommand, SurfaceKind,
    SurfacePort, TabContext, TabId, VaultPopouts,
};

pub struct FakeAuth {
    status: Mutex<AuthStatus>,
}

impl FakeAuth {
    pub fn set(&self, status: AuthStatus) {
        *self.status.lock() = status;
    }
}

#[async_trait]
impl AuthStatusProvider for FakeAuth {
    async fn auth_status(&self) -> AuthStatus {
        *self.status.lock()
    }
}

pub struct FakeCredentials {
    pub credentials: Mutex<Vec<CredentialView>>,
    pub reads: AtomicUsize,
}

#[async_trait]
impl CredentialProvider for FakeCredentials {
    async fn credentials_for_tab(&self, _tab: &TabContext) -> Result<Vec<CredentialView>, ProviderError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.credentials.lock().clone())
    }
}

pub struct FakeSettings;

#[async_trait]
impl SettingsProvider for FakeSettings {
    async fn theme(&self) -> String {
        "dark".to_string()
    }

    async fn translations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("inlineMenuListTitle".to_string(), "Vault".to_string())])
    }

    async fn show_favicons(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct FakeAutofill {
    pub reprompt: AtomicBool,
    pub fills: Mutex<Vec<(TabId, String, usize)>>,
}

#[async_trait]
impl AutofillService for FakeAutofill {
    async fn is_reprompt_required(&self, _credential: &CredentialView, _tab: &TabContext) -> bool {
        self.reprompt.load(Ordering::SeqCst)
    }

    async fn fill(&self, request: FillRequest<'_>) -> Result<(), ProviderError> {
        if request.credential.name == "explodes" {
            panic!("autofill bug");
        }
        self.fills.lock().push((
            request.tab.id,
            request.credential.id.clone(),
            request.page_details.len(),
        ));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePopouts {
    pub unlocks: Mutex<Vec<TabId>>,
    pub views: Mutex<Vec<String>>,
    pub reprompts: Mutex<Vec<(TabId, String)>>,
}

#[async_trait]
impl VaultPopouts for FakePopouts {
    async fn open_unlock(&self, tab: &TabContext) -> Result<(), ProviderError> {
        self.unlocks.lock().push(tab.id);
        Ok(())
    }

    async fn open_view_item(&self, _tab: &TabContext, credential_id: &str) -> Result<(), ProviderError> {
        self.views.lock().push(credential_id.to_string());
        Ok(())
    }

    async fn open_password_reprompt(
        &self,
        tab: &TabContext,
        credential_id: &str,
    ) -> Result<(), ProviderError> {
        self.reprompts.lock().push((tab.id, credential_id.to_string()));
        Ok(())
    }
}

/// Frame tree shared by every tab, with per-frame answers.
#[derive(Default)]
pub struct FakeFrames {
    tree: Mutex<HashMap<FrameId, FrameDetails>>,
    /// Where each frame says its child sits, keyed by the parent.
    offsets: Mutex<HashMap<FrameId, Value>>,
    pub in_viewport: AtomicBool,
    pub field_has_value: AtomicBool,
    pub requests: Mutex<Vec<(TabId, FrameId, FrameRequest)>>,
    pub notifications: Mutex<Vec<(TabId, FrameId, FrameRequest)>>,
}

impl FakeFrames {
    pub fn add_frame(&self, id: i64, parent: Option<i64>, child_offset: Option<(f64, f64)>) {
        self.tree.lock().insert(
            FrameId(id),
            FrameDetails {
                frame_id: FrameId(id),
                parent_frame_id: parent.map(FrameId),
                url: format!("https://frame{}.test/", id),
            },
        );
        let answer = match child_offset {
            Some((top, left)) => json!({ "top": top, "left": left }),
            None => Value::Null,
        };
        self.offsets.lock().insert(FrameId(id), answer);
    }

    pub fn notified(&self, command: &str) -> Vec<(TabId, FrameId, FrameRequest)> {
        self.notifications
            .lock()
            .iter()
            .filter(|(_, _, request)| request.command_name() == command)
            .cloned()
            .collect()
    }

    pub fn requested(&self, command: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|(_, _, request)| request.command_name() == command)
            .count()
    }
}

#[async_trait]
impl FrameMessenger for FakeFrames {
    async fn request(
        &self,
        tab: TabId,
        frame: FrameId,
        request: FrameRequest,
    ) -> Result<Option<Value>, FrameError> {
        self.requests.lock().push((tab, frame, request.clone()));
        match request {
            FrameRequest::GetSubFrameOffsets { .. } => Ok(self.offsets.lock().get(&frame).cloned()),
            FrameRequest::CheckIsMostRecentlyFocusedFieldWithinViewport => {
                Ok(Some(Value::Bool(self.in_viewport.load(Ordering::SeqCst))))
            }
            FrameRequest::CheckMostRecentlyFocusedFieldHasValue => {
                Ok(Some(Value::Bool(self.field_has_value.load(Ordering::SeqCst))))
            }
            _ => Ok(None),
        }
    }

    async fn notify(&self, tab: TabId, frame: FrameId, request: FrameRequest) -> Result<(), FrameError> {
        self.notifications.lock().push((tab, frame, request));
        Ok(())
    }

    async fn frame_details(&self, _tab: TabId, frame: FrameId) -> Option<FrameDetails> {
        self.tree.lock().get(&frame).cloned()
    }
}

pub struct RecordingPort {
    id: PortId,
    kind: SurfaceKind,
    sender: MessageSender,
    pub posted: Mutex<Vec<SurfaceCommand>>,
    pub disconnected: AtomicBool,
}

impl RecordingPort {
    pub fn commands(&self) -> Vec<&'static str> {
        self.posted.lock().iter().map(SurfaceCommand::command_name).collect()
    }

    pub fn signing_key(&self) -> String {
        self.posted
            .lock()
            .iter()
            .find_map(|command| match command {
                SurfaceCommand::InitButton(init) | SurfaceCommand::InitList(init) => {
                    Some(init.signing_key.clone())
                }
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn last_position(&self) -> Option<inline_menu_protocols::PositionStyles> {
        self.posted.lock().iter().rev().find_map(|command| match command {
            SurfaceCommand::UpdateAutofillInlineMenuPosition { styles } => Some(*styles),
            _ => None,
        })
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.posted.lock().clear();
    }
}

impl SurfacePort for RecordingPort {
    fn id(&self) -> PortId {
        self.id
    }

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn sender(&self) -> &MessageSender {
        &self.sender
    }

    fn post(&self, command: SurfaceCommand) {
        self.posted.lock().push(command);
    }

    fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

pub fn login(id: &str, name: &str) -> CredentialView {
    CredentialView {
        id: id.to_string(),
        name: name.to_string(),
        credential_type: CredentialType::Login,
        reprompt: false,
        favorite: false,
        login: Some(LoginView {
            username: Some(format!("{}@example.com", id)),
            uris: vec![format!("https://{}.example.com/login", id)],
        }),
        card: None,
    }
}

pub fn sender(tab: i64, frame: i64) -> MessageSender {
    MessageSender::new(
        TabContext::new(TabId(tab)).with_url("https://example.com/login"),
        FrameId(frame),
    )
    .with_url(format!("https://frame{}.test/", frame))
}

pub struct Harness {
    pub coordinator: Arc<Coordinator>,
    pub router: CommandRouter,
    pub auth: Arc<FakeAuth>,
    pub credentials: Arc<FakeCredentials>,
    pub autofill: Arc<FakeAutofill>,
    pub popouts: Arc<FakePopouts>,
    pub frames: Arc<FakeFrames>,
    next_port: AtomicU64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(CoordinatorSettings::default())
    }

    pub fn with_settings(settings: CoordinatorSettings) -> Self {
        let auth = Arc::new(FakeAuth {
            status: Mutex::new(AuthStatus::Unlocked),
        });
        let credentials = Arc::new(FakeCredentials {
            credentials: Mutex::new(vec![
                login("alpha", "Alpha"),
                login("beta", "Beta"),
                login("gamma", "Gamma"),
            ]),
            reads: AtomicUsize::new(0),
        });
        let autofill = Arc::new(FakeAutofill::default());
        let popouts = Arc::new(FakePopouts::default());
        let frames = Arc::new(FakeFrames::default());
        frames.add_frame(0, None, Some((0.0, 0.0)));
        frames.in_viewport.store(true, Ordering::SeqCst);

        let coordinator = Coordinator::new(
            settings,
            Collaborators {
                auth: auth.clone(),
                credentials: credentials.clone(),
                settings: Arc::new(FakeSettings),
                autofill: autofill.clone(),
                popouts: popouts.clone(),
                frames: frames.clone(),
            },
        );
        Self {
            router: CommandRouter::new(coordinator.clone()),
            coordinator,
            auth,
            credentials,
            autofill,
            popouts,
            frames,
            next_port: AtomicU64::new(1),
        }
    }

    /// Route a frame message and return its reply.
    pub async fn frame(&self, tab: i64, frame: i64, message: Value) -> Option<Value> {
        self.router.route_frame(message, sender(tab, frame)).await
    }

    pub async fn focus_field(&self, tab: i64, frame: i64, top: f64, left: f64, width: f64, height: f64) {
        self.frame(
            tab,
            frame,
            json!({
                "command": "updateFocusedFieldData",
                "focusedFieldData": {
                    "focusedFieldRects": { "top": top, "left": left, "width": width, "height": height },
                    "focusedFieldStyles": {}
                }
            }),
        )
        .await;
    }

    pub async fn report_fields(&self, tab: i64, frame: i64) {
        self.frame(
            tab,
            frame,
            json!({
                "command": "collectPageDetailsResponse",
                "details": { "fields": [{ "opid": "__0" }] }
            }),
        )
        .await;
    }

    /// Connect a surface and run its handshake.
    pub async fn connect(&self, tab: i64, kind: SurfaceKind) -> Arc<RecordingPort> {
        let port = Arc::new(RecordingPort {
            id: PortId(self.next_port.fetch_add(1, Ordering::SeqCst)),
            kind,
            sender: sender(tab, 0),
            posted: Mutex::new(Vec::new()),
            disconnected: AtomicBool::new(false),
        });
        let dyn_port: Arc<dyn SurfacePort> = port.clone();
        self.coordinator.connect_surface(dyn_port).await.unwrap();
        port
    }

    /// Send a signed message from a surface.
    pub async fn surface(&self, port: &Arc<RecordingPort>, mut message: Value, key: Option<&str>) {
        if let Some(key) = key {
            message["signingKey"] = json!(key);
        }
        let dyn_port: Arc<dyn SurfacePort> = port.clone();
        self.router.route_surface(&dyn_port, message).await;
    }
}
