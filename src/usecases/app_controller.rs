//! Application state controller. Owns the current user and device list and
//! mediates every mutation.
//!
//! - Each mutation is followed by a full snapshot write via LocalStore
//! - Analyses are single-flight per device id; distinct devices may run concurrently
//! - The state lock is never held across an AI request

use crate::adapters::persistence::LocalStore;
use crate::domain::{
    Device, DeviceAnalysis, DomainError, NewDevice, SCORE_PER_ANALYSIS, User, seed_devices,
};
use crate::ports::AnalysisPort;
use chrono::Datelike;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Registered,
}

/// Top-level navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Devices,
    Consultant,
    Rules,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Devices, Tab::Consultant, Tab::Rules];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Devices => "My Devices",
            Tab::Consultant => "AI Consultant",
            Tab::Rules => "E-Waste Rules",
        }
    }
}

/// Result of an analysis trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// A new analysis was computed, stored, and rewarded.
    Completed(DeviceAnalysis),
    /// The device already had an analysis; nothing was requested.
    Viewing(DeviceAnalysis),
    /// A request for this device is already outstanding.
    Suppressed,
}

/// Numbers shown on the dashboard.
///
/// The impact figures are copied from the user record. Only the two device
/// counts come from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactSummary {
    pub co2_saved: f64,
    pub e_waste_prevented: f64,
    pub score: u32,
    pub devices_tracked: usize,
    pub devices_analyzed: usize,
}

struct AppState {
    user: User,
    session: Session,
    devices: Vec<Device>,
    active_tab: Tab,
    viewing_analysis: Option<String>,
    in_flight: HashSet<String>,
}

pub struct AppController {
    store: LocalStore,
    analyzer: Arc<dyn AnalysisPort>,
    state: Mutex<AppState>,
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

impl AppController {
    /// Restore state from storage. Seeds and persists the example devices
    /// when no usable device snapshot exists.
    pub async fn load(store: LocalStore, analyzer: Arc<dyn AnalysisPort>) -> Self {
        let (user, session) = match store.load_user().await {
            Some(user) => (user, Session::Registered),
            None => (User::default(), Session::Anonymous),
        };

        let devices = match store.load_devices().await {
            Some(devices) => devices,
            None => {
                let seeded = seed_devices();
                info!(count = seeded.len(), "no device snapshot, seeding examples");
                if let Err(e) = store.save_devices(&seeded).await {
                    warn!(error = %e, "failed to persist seeded devices");
                }
                seeded
            }
        };

        info!(
            session = ?session,
            devices = devices.len(),
            "application state loaded"
        );

        Self {
            store,
            analyzer,
            state: Mutex::new(AppState {
                user,
                session,
                devices,
                active_tab: Tab::default(),
                viewing_analysis: None,
                in_flight: HashSet::new(),
            }),
        }
    }

    pub async fn session(&self) -> Session {
        self.state.lock().await.session
    }

    pub async fn user(&self) -> User {
        self.state.lock().await.user.clone()
    }

    /// Newest first.
    pub async fn devices(&self) -> Vec<Device> {
        self.state.lock().await.devices.clone()
    }

    pub async fn device(&self, device_id: &str) -> Option<Device> {
        self.state
            .lock()
            .await
            .devices
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
    }

    pub async fn active_tab(&self) -> Tab {
        self.state.lock().await.active_tab
    }

    pub async fn set_active_tab(&self, tab: Tab) {
        let mut state = self.state.lock().await;
        state.active_tab = tab;
        state.viewing_analysis = None;
    }

    /// Device id whose analysis detail is in focus.
    pub async fn viewing_analysis(&self) -> Option<String> {
        self.state.lock().await.viewing_analysis.clone()
    }

    pub async fn close_analysis(&self) {
        self.state.lock().await.viewing_analysis = None;
    }

    pub async fn is_analyzing(&self, device_id: &str) -> bool {
        self.state.lock().await.in_flight.contains(device_id)
    }

    pub async fn impact_summary(&self) -> ImpactSummary {
        let state = self.state.lock().await;
        ImpactSummary {
            co2_saved: state.user.stats.co2_saved,
            e_waste_prevented: state.user.stats.e_waste_prevented,
            score: state.user.stats.score,
            devices_tracked: state.devices.len(),
            devices_analyzed: state.devices.iter().filter(|d| d.is_analyzed()).count(),
        }
    }

    /// Start a session. The user record is the default profile with `name`
    /// and a fresh id. `location` is required but not stored.
    pub async fn register(&self, name: &str, location: &str) -> Result<User, DomainError> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        if location.is_empty() {
            return Err(DomainError::Validation("location is required".to_string()));
        }

        let user = User {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            ..User::default()
        };

        let mut state = self.state.lock().await;
        state.user = user.clone();
        state.session = Session::Registered;
        self.persist_user(&state.user).await;

        info!(user_id = %user.id, location, "user registered");
        Ok(user)
    }

    /// End the session. Only the user record is dropped; devices stay.
    pub async fn sign_out(&self) {
        let mut state = self.state.lock().await;
        if let Err(e) = self.store.clear_user().await {
            warn!(error = %e, "failed to clear user snapshot");
        }
        state.session = Session::Anonymous;
        state.user = User::default();
        state.viewing_analysis = None;
        state.active_tab = Tab::Dashboard;
        info!("signed out");
    }

    /// Register a device. It is placed first in the list.
    pub async fn add_device(&self, fields: NewDevice) -> Result<Device, DomainError> {
        let mut state = self.state.lock().await;
        if state.session != Session::Registered {
            return Err(DomainError::NotRegistered);
        }

        let device = fields.into_device(uuid::Uuid::new_v4().simple().to_string(), current_year());
        state.devices.insert(0, device.clone());
        self.persist_devices(&state.devices).await;

        info!(device_id = %device.id, name = %device.name, "device added");
        Ok(device)
    }

    /// Analyze a device, or surface its existing analysis.
    ///
    /// On failure the device stays unanalyzed, the score is unchanged, and the
    /// device can be triggered again.
    pub async fn trigger_analysis(&self, device_id: &str) -> Result<AnalysisOutcome, DomainError> {
        let device = {
            let mut state = self.state.lock().await;
            if state.session != Session::Registered {
                return Err(DomainError::NotRegistered);
            }
            let device = state
                .devices
                .iter()
                .find(|d| d.id == device_id)
                .cloned()
                .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))?;

            if let Some(existing) = &device.analysis {
                state.viewing_analysis = Some(device_id.to_string());
                return Ok(AnalysisOutcome::Viewing(existing.clone()));
            }
            if !state.in_flight.insert(device_id.to_string()) {
                debug!(device_id, "analysis already in flight, ignoring trigger");
                return Ok(AnalysisOutcome::Suppressed);
            }
            device
        };

        // Run on its own task so a panicking analyzer still releases the in-flight id.
        let analyzer = Arc::clone(&self.analyzer);
        let result = tokio::spawn(async move { analyzer.analyze_device(&device).await })
            .await
            .unwrap_or_else(|e| Err(DomainError::Ai(format!("analysis task aborted: {}", e))));

        let mut state = self.state.lock().await;
        state.in_flight.remove(device_id);

        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(device_id, error = %e, "device analysis failed");
                return Err(DomainError::AnalysisFailed(e.to_string()));
            }
        };

        // Merge into the current list: other mutations may have landed meanwhile.
        let target = state
            .devices
            .iter_mut()
            .find(|d| d.id == device_id)
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))?;
        target.analysis = Some(analysis.clone());
        self.persist_devices(&state.devices).await;

        state.user.stats.score += SCORE_PER_ANALYSIS;
        if state.session == Session::Registered {
            self.persist_user(&state.user).await;
            state.viewing_analysis = Some(device_id.to_string());
        }

        info!(
            device_id,
            score = state.user.stats.score,
            recommendation = %analysis.recommendation,
            "analysis stored"
        );
        Ok(AnalysisOutcome::Completed(analysis))
    }

    async fn persist_devices(&self, devices: &[Device]) {
        if let Err(e) = self.store.save_devices(devices).await {
            warn!(error = %e, "failed to persist device snapshot");
        }
    }

    async fn persist_user(&self, user: &User) {
        if let Err(e) = self.store.save_user(user).await {
            warn!(error = %e, "failed to persist user snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::{DEVICES_KEY, MemoryStore};
    use crate::domain::{
        ComponentBreakdown, DeviceCategory, DeviceStatus, Recommendation,
    };
    use crate::ports::KeyValueStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Semaphore, mpsc};

    fn sample_analysis() -> DeviceAnalysis {
        DeviceAnalysis {
            sustainability_score: 64,
            recommendation: Recommendation::Repair,
            lifecycle_stage: "Mature".to_string(),
            breakdown: ComponentBreakdown {
                repairable: vec!["Screen".to_string()],
                recyclable: vec!["Copper".to_string()],
                hazardous: vec!["Lithium-ion battery".to_string()],
            },
            india_specific_steps: vec!["Visit an authorized service centre".to_string()],
            educational_insight: "Repair extends life.".to_string(),
        }
    }

    /// Counts calls; fails the first `failures` of them.
    struct ScriptedAnalyzer {
        calls: AtomicUsize,
        failures: usize,
    }

    impl ScriptedAnalyzer {
        fn ok() -> Arc<Self> {
            Self::failing(0)
        }

        fn failing(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failures,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl AnalysisPort for ScriptedAnalyzer {
        async fn analyze_device(&self, _device: &Device) -> Result<DeviceAnalysis, DomainError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(DomainError::Ai("network down".to_string()))
            } else {
                Ok(sample_analysis())
            }
        }
    }

    /// Blocks every request until the test releases a permit.
    struct GatedAnalyzer {
        started: mpsc::UnboundedSender<String>,
        release: Semaphore,
    }

    #[async_trait::async_trait]
    impl AnalysisPort for GatedAnalyzer {
        async fn analyze_device(&self, device: &Device) -> Result<DeviceAnalysis, DomainError> {
            let _ = self.started.send(device.id.clone());
            self.release
                .acquire()
                .await
                .map_err(|e| DomainError::Ai(e.to_string()))?
                .forget();
            Ok(sample_analysis())
        }
    }

    struct PanickingAnalyzer;

    #[async_trait::async_trait]
    impl AnalysisPort for PanickingAnalyzer {
        async fn analyze_device(&self, device: &Device) -> Result<DeviceAnalysis, DomainError> {
            panic!("analyzer blew up on {}", device.id);
        }
    }

    async fn controller_with(
        analyzer: Arc<dyn AnalysisPort>,
    ) -> (Arc<MemoryStore>, LocalStore, AppController) {
        let backend = Arc::new(MemoryStore::new());
        let store = LocalStore::new(Arc::clone(&backend) as Arc<dyn KeyValueStore>);
        let controller = AppController::load(store.clone(), analyzer).await;
        (backend, store, controller)
    }

    #[tokio::test]
    async fn test_first_run_seeds_two_devices() {
        let (_, store, controller) = controller_with(ScriptedAnalyzer::ok()).await;

        let devices = controller.devices().await;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "OnePlus 7 Pro");
        assert_eq!(devices[0].purchase_year, 2019);
        assert_eq!(devices[0].status, DeviceStatus::Working);
        assert_eq!(devices[1].name, "Dell XPS 13");
        assert_eq!(devices[1].purchase_year, 2018);
        assert_eq!(devices[1].status, DeviceStatus::MajorDamage);

        assert_eq!(store.load_devices().await, Some(devices));
        assert_eq!(controller.session().await, Session::Anonymous);
    }

    #[tokio::test]
    async fn test_existing_snapshot_is_not_reseeded() {
        let backend = Arc::new(MemoryStore::new());
        let store = LocalStore::new(Arc::clone(&backend) as Arc<dyn KeyValueStore>);
        store.save_devices(&seed_devices()[..1]).await.unwrap();
        store.save_user(&User::default()).await.unwrap();

        let controller = AppController::load(store, ScriptedAnalyzer::ok()).await;
        assert_eq!(controller.devices().await.len(), 1);
        assert_eq!(controller.session().await, Session::Registered);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_seed() {
        let backend = Arc::new(MemoryStore::new());
        backend.insert(DEVICES_KEY, "not json at all").await;
        let store = LocalStore::new(Arc::clone(&backend) as Arc<dyn KeyValueStore>);

        let controller = AppController::load(store.clone(), ScriptedAnalyzer::ok()).await;
        assert_eq!(controller.devices().await, seed_devices());
        assert_eq!(store.load_devices().await, Some(seed_devices()));
    }

    #[tokio::test]
    async fn test_register_then_sign_out() {
        let (_, store, controller) = controller_with(ScriptedAnalyzer::ok()).await;

        let user = controller.register("Aravind", "Pune").await.unwrap();
        assert_eq!(controller.session().await, Session::Registered);

        let persisted = store.load_user().await.unwrap();
        assert_eq!(persisted, user);
        assert_eq!(persisted.name, "Aravind");
        assert_eq!(persisted.email, User::default().email);
        assert_eq!(persisted.stats, User::default().stats);

        controller.set_active_tab(Tab::Rules).await;
        controller.trigger_analysis("1").await.unwrap();
        let devices_before = store.load_devices().await;

        controller.sign_out().await;
        assert_eq!(controller.session().await, Session::Anonymous);
        assert_eq!(controller.active_tab().await, Tab::Dashboard);
        assert_eq!(controller.viewing_analysis().await, None);
        assert_eq!(store.load_user().await, None);
        assert_eq!(store.load_devices().await, devices_before);
    }

    #[tokio::test]
    async fn test_register_requires_name_and_location() {
        let (_, store, controller) = controller_with(ScriptedAnalyzer::ok()).await;
        assert!(matches!(
            controller.register("  ", "Pune").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            controller.register("Aravind", "").await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(store.load_user().await, None);
    }

    #[tokio::test]
    async fn test_add_device_applies_defaults() {
        let (_, store, controller) = controller_with(ScriptedAnalyzer::ok()).await;
        controller.register("Aravind", "Pune").await.unwrap();

        let device = controller
            .add_device(NewDevice {
                brand: Some("Sony".to_string()),
                model: Some("WH-1000".to_string()),
                category: Some(DeviceCategory::Audio),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(device.status, DeviceStatus::Working);
        assert_eq!(device.name, "Sony WH-1000");
        assert_eq!(device.purchase_year, current_year());

        let persisted = store.load_devices().await.unwrap();
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted[0], device);
    }

    #[tokio::test]
    async fn test_add_device_requires_session() {
        let (_, _, controller) = controller_with(ScriptedAnalyzer::ok()).await;
        let result = controller.add_device(NewDevice::default()).await;
        assert!(matches!(result, Err(DomainError::NotRegistered)));
    }

    #[tokio::test]
    async fn test_analysis_success_attaches_once_and_rewards() {
        let analyzer = ScriptedAnalyzer::ok();
        let (_, store, controller) = controller_with(analyzer.clone()).await;
        controller.register("Aravind", "Pune").await.unwrap();
        let score_before = controller.user().await.stats.score;

        let outcome = controller.trigger_analysis("2").await.unwrap();
        assert_eq!(outcome, AnalysisOutcome::Completed(sample_analysis()));
        assert_eq!(analyzer.calls(), 1);
        assert_eq!(controller.viewing_analysis().await.as_deref(), Some("2"));

        let persisted_user = store.load_user().await.unwrap();
        assert_eq!(persisted_user.stats.score, score_before + 15);
        let persisted_devices = store.load_devices().await.unwrap();
        let laptop = persisted_devices.iter().find(|d| d.id == "2").unwrap();
        assert_eq!(laptop.analysis, Some(sample_analysis()));
        let phone = persisted_devices.iter().find(|d| d.id == "1").unwrap();
        assert_eq!(phone.analysis, None);
    }

    #[tokio::test]
    async fn test_analyzed_device_is_viewed_not_recomputed() {
        let analyzer = ScriptedAnalyzer::ok();
        let (_, _, controller) = controller_with(analyzer.clone()).await;
        controller.register("Aravind", "Pune").await.unwrap();
        controller.trigger_analysis("1").await.unwrap();
        controller.close_analysis().await;
        let score = controller.user().await.stats.score;

        let outcome = controller.trigger_analysis("1").await.unwrap();
        assert_eq!(outcome, AnalysisOutcome::Viewing(sample_analysis()));
        assert_eq!(analyzer.calls(), 1);
        assert_eq!(controller.user().await.stats.score, score);
        assert_eq!(controller.viewing_analysis().await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_analysis_failure_leaves_device_retriggerable() {
        let analyzer = ScriptedAnalyzer::failing(1);
        let (_, store, controller) = controller_with(analyzer.clone()).await;
        controller.register("Aravind", "Pune").await.unwrap();
        let score = controller.user().await.stats.score;

        let err = controller.trigger_analysis("2").await.unwrap_err();
        assert!(matches!(err, DomainError::AnalysisFailed(_)));
        assert!(err.to_string().starts_with(crate::domain::ANALYSIS_FAILURE_NOTICE));
        assert!(!controller.is_analyzing("2").await);
        assert_eq!(controller.device("2").await.unwrap().analysis, None);
        assert_eq!(controller.user().await.stats.score, score);
        assert_eq!(store.load_user().await.unwrap().stats.score, score);

        let retry = controller.trigger_analysis("2").await.unwrap();
        assert!(matches!(retry, AnalysisOutcome::Completed(_)));
        assert_eq!(analyzer.calls(), 2);
    }

    #[tokio::test]
    async fn test_analyzer_panic_releases_device() {
        let (_, _, controller) = controller_with(Arc::new(PanickingAnalyzer)).await;
        controller.register("Aravind", "Pune").await.unwrap();

        let err = controller.trigger_analysis("1").await.unwrap_err();
        assert!(matches!(err, DomainError::AnalysisFailed(_)));
        assert!(!controller.is_analyzing("1").await);
        assert_eq!(controller.device("1").await.unwrap().analysis, None);
    }

    #[tokio::test]
    async fn test_extreme_purchase_year_from_snapshot() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .insert(
                DEVICES_KEY,
                r#"[{"id":"x","name":"Relic","brand":"Relic","model":"","category":"camera","purchaseYear":-2147483648,"status":"Dead"}]"#,
            )
            .await;
        let store = LocalStore::new(Arc::clone(&backend) as Arc<dyn KeyValueStore>);
        let analyzer = Arc::new(crate::adapters::ai::MockAiAdapter::with_delay(0));
        let controller = AppController::load(store.clone(), analyzer).await;
        controller.register("Aravind", "Pune").await.unwrap();

        let analysis = match controller.trigger_analysis("x").await.unwrap() {
            AnalysisOutcome::Completed(analysis) => analysis,
            other => panic!("expected a completed analysis, got {:?}", other),
        };
        assert_eq!(analysis.recommendation, Recommendation::Recycle);
        assert_eq!(analysis.sustainability_score, 5);
        assert!(!controller.is_analyzing("x").await);
        assert!(store.load_devices().await.unwrap()[0].is_analyzed());
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let (_, _, controller) = controller_with(ScriptedAnalyzer::ok()).await;
        controller.register("Aravind", "Pune").await.unwrap();
        assert!(matches!(
            controller.trigger_analysis("missing").await,
            Err(DomainError::DeviceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_single_flight_per_device_but_concurrent_across_devices() {
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let analyzer = Arc::new(GatedAnalyzer {
            started: started_tx,
            release: Semaphore::new(0),
        });
        let (_, store, controller) =
            controller_with(Arc::clone(&analyzer) as Arc<dyn AnalysisPort>).await;
        let controller = Arc::new(controller);
        controller.register("Aravind", "Pune").await.unwrap();
        let score = controller.user().await.stats.score;

        let first = {
            let c = Arc::clone(&controller);
            tokio::spawn(async move { c.trigger_analysis("1").await })
        };
        assert_eq!(started_rx.recv().await.as_deref(), Some("1"));
        assert!(controller.is_analyzing("1").await);

        let duplicate = controller.trigger_analysis("1").await.unwrap();
        assert_eq!(duplicate, AnalysisOutcome::Suppressed);

        let second = {
            let c = Arc::clone(&controller);
            tokio::spawn(async move { c.trigger_analysis("2").await })
        };
        assert_eq!(started_rx.recv().await.as_deref(), Some("2"));
        assert!(controller.is_analyzing("2").await);

        analyzer.release.add_permits(2);
        assert!(matches!(
            first.await.unwrap().unwrap(),
            AnalysisOutcome::Completed(_)
        ));
        assert!(matches!(
            second.await.unwrap().unwrap(),
            AnalysisOutcome::Completed(_)
        ));

        let devices = store.load_devices().await.unwrap();
        assert!(devices.iter().all(|d| d.analysis.is_some()));
        assert_eq!(store.load_user().await.unwrap().stats.score, score + 30);
    }

    #[tokio::test]
    async fn test_impact_summary_is_not_derived_from_devices() {
        let (_, _, controller) = controller_with(ScriptedAnalyzer::ok()).await;
        controller.register("Aravind", "Pune").await.unwrap();
        controller.trigger_analysis("1").await.unwrap();

        let summary = controller.impact_summary().await;
        assert_eq!(summary.co2_saved, 124.5);
        assert_eq!(summary.e_waste_prevented, 12.8);
        assert_eq!(summary.score, 865);
        assert_eq!(summary.devices_tracked, 2);
        assert_eq!(summary.devices_analyzed, 1);
    }
}
