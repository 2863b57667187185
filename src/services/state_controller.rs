use crate::config::IntervalSource;
use crate::error::Result;
use crate::events::FocusRegion;
use crate::services::{CommandHost, DispatchReport, Notifier, ProceederLoop, StatusIndicator, StatusView, WindowStore};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Ключ флага в хранилище окна
pub const ENABLED_KEY: &str = "auto_proceed_enabled";

/// Внешние зависимости контроллера
pub struct ControllerDeps {
    pub store: Arc<dyn WindowStore>,
    pub interval: Arc<dyn IntervalSource>,
    pub status: Arc<dyn StatusIndicator>,
    pub notifier: Arc<dyn Notifier>,
    pub host: Arc<dyn CommandHost>,
    /// Команда хоста для сквозного ввода
    pub type_command: String,
}

/// Владелец флага `enabled` одного окна и единственного таймера.
///
/// Флаг меняется только через [`StateController::set_enabled`], которая в том
/// же синхронном шаге запускает или останавливает цикл, поэтому флаг и таймер
/// не расходятся.
pub struct StateController {
    enabled: bool,
    proceeder: ProceederLoop,
    deps: ControllerDeps,
}

impl StateController {
    pub fn new(proceeder: ProceederLoop, deps: ControllerDeps) -> Self {
        let enabled = match deps.store.get_flag_or(ENABLED_KEY, false) {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!("Не удалось прочитать сохранённое состояние, считаем выключенным: {}", e);
                false
            }
        };

        info!("Сохранённое состояние окна: {}", if enabled { "ON" } else { "OFF" });

        Self {
            enabled,
            proceeder,
            deps,
        }
    }

    /// Начало сессии окна: поднимает таймер по сохранённому флагу и рисует статус
    pub fn activate(&mut self) {
        if self.enabled {
            self.start_loop();
        }
        self.deps.status.show(&StatusView::for_state(self.enabled));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[allow(dead_code)]
    pub fn is_loop_running(&self) -> bool {
        self.proceeder.is_running()
    }

    #[allow(dead_code)]
    pub fn live_timer_tasks(&self) -> usize {
        self.proceeder.live_tasks()
    }

    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    pub fn disable(&mut self) {
        self.set_enabled(false);
    }

    /// Порядок: сохранение, таймер, статус, уведомление
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;

        if let Err(e) = self.deps.store.set_flag(ENABLED_KEY, enabled) {
            warn!("Не удалось сохранить состояние окна: {}", e);
        }

        if enabled {
            self.start_loop();
        } else {
            self.proceeder.stop();
        }

        self.deps.status.show(&StatusView::for_state(enabled));

        let message = if enabled {
            "Auto Proceed ENABLED for this window"
        } else {
            "Auto Proceed DISABLED for this window"
        };
        self.deps.notifier.notify(message);
    }

    /// Политика фокуса: терминал и редактор включают, всё остальное выключает.
    /// Побочные эффекты выполняются даже при неизменном состоянии.
    pub fn on_focus_changed(&mut self, region: FocusRegion) {
        match region {
            FocusRegion::Terminal => info!("Фокус в терминале -> Auto Proceed ON"),
            FocusRegion::Editor => info!("Фокус вернулся в редактор -> Auto Proceed ON"),
            FocusRegion::NoEditor => info!("Фокус ушёл из редактора (чат?) -> Auto Proceed OFF"),
        }
        self.set_enabled(region.desired_state());
    }

    /// Enter с включением: сначала флаг и таймер, затем сквозной ввод newline.
    /// Между этими шагами нет точки ожидания.
    pub async fn smart_confirm(&mut self) -> Result<()> {
        info!("Smart Enter");

        if !self.enabled {
            self.set_enabled(true);
        }

        let args = json!({ "text": "\n" });
        self.deps.host.execute(&self.deps.type_command, Some(&args)).await
    }

    /// Один проход вне расписания с подтверждением пользователю
    pub async fn trigger_now(&self) -> DispatchReport {
        let report = self.proceeder.trigger_now().await;
        self.deps.notifier.notify("Manual trigger executed");
        report
    }

    /// Конец сессии: таймер и индикатор освобождаются, флаг остаётся как есть
    pub fn shutdown(&mut self) {
        self.proceeder.stop();
        self.deps.status.hide();
    }

    fn start_loop(&mut self) {
        let period = self.deps.interval.interval();
        self.proceeder.start(period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{
        settle, FailingStore, FixedInterval, Journal, RecordingHost, RecordingNotifier, RecordingStatus,
    };
    use crate::services::{CommandDispatcher, MemoryStorage};
    use tokio::time::Duration;

    struct Fixture {
        journal: Journal,
        storage: MemoryStorage,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                journal: Journal::new(),
                storage: MemoryStorage::new(),
            }
        }

        fn controller(&self, window: &str) -> StateController {
            self.controller_with_store(Arc::new(self.storage.for_window(window)))
        }

        fn controller_with_store(&self, store: Arc<dyn WindowStore>) -> StateController {
            let host: Arc<dyn CommandHost> = Arc::new(RecordingHost::failing(
                self.journal.clone(),
                &["c1", "c3", "c5"],
            ));
            let commands = ["c1", "c2", "c3", "c4", "c5"].iter().map(|c| c.to_string()).collect();
            let proceeder = ProceederLoop::new(CommandDispatcher::new(Arc::clone(&host), commands));

            StateController::new(
                proceeder,
                ControllerDeps {
                    store,
                    interval: Arc::new(FixedInterval(Duration::from_millis(1500))),
                    status: Arc::new(RecordingStatus(self.journal.clone())),
                    notifier: Arc::new(RecordingNotifier(self.journal.clone())),
                    host,
                    type_command: "default:type".to_string(),
                },
            )
        }
    }

    fn assert_invariant(controller: &StateController) {
        assert_eq!(controller.is_enabled(), controller.is_loop_running());
        assert_eq!(controller.live_timer_tasks(), usize::from(controller.is_enabled()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_defaults_to_disabled() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");
        controller.activate();

        assert!(!controller.is_enabled());
        assert_invariant(&controller);
        assert_eq!(fixture.journal.entries(), vec!["status:off"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_resumes_persisted_state() {
        let fixture = Fixture::new();
        fixture.storage.for_window("w1").set_flag(ENABLED_KEY, true).unwrap();

        let mut controller = fixture.controller("w1");
        controller.activate();
        settle().await;

        assert!(controller.is_enabled());
        assert_invariant(&controller);
        // Без уведомления при старте
        assert_eq!(fixture.journal.count_prefix("notify:"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_side_effects_in_order() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        controller.enable();

        assert_eq!(
            fixture.journal.entries(),
            vec!["status:on", "notify:Auto Proceed ENABLED for this window"]
        );
        assert_eq!(fixture.storage.for_window("w1").get_flag(ENABLED_KEY).unwrap(), Some(true));
        assert_eq!(fixture.storage.for_window("w2").get_flag(ENABLED_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_twice_restarts_single_timer() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        controller.enable();
        controller.enable();
        settle().await;

        assert!(controller.is_enabled());
        assert_invariant(&controller);

        fixture.journal.clear();
        tokio::time::sleep(Duration::from_millis(1600)).await;
        // Ровно один проход из пяти команд
        assert_eq!(fixture.journal.count_prefix("dispatch:"), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_twice_returns_to_original() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        assert!(controller.toggle());
        settle().await;
        assert_invariant(&controller);

        assert!(!controller.toggle());
        settle().await;
        assert_invariant(&controller);
        assert_eq!(fixture.storage.for_window("w1").get_flag(ENABLED_KEY).unwrap(), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_mapping_follows_last_event() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        controller.on_focus_changed(FocusRegion::Terminal);
        controller.on_focus_changed(FocusRegion::NoEditor);
        settle().await;
        assert!(!controller.is_enabled());
        assert_invariant(&controller);

        controller.on_focus_changed(FocusRegion::NoEditor);
        controller.on_focus_changed(FocusRegion::Editor);
        settle().await;
        assert!(controller.is_enabled());
        assert_invariant(&controller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_focus_still_runs_side_effects() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        controller.on_focus_changed(FocusRegion::Editor);
        controller.on_focus_changed(FocusRegion::Editor);

        assert_eq!(fixture.journal.count_prefix("status:on"), 2);
        assert_eq!(fixture.journal.count_prefix("notify:"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_loop_never_dispatches() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        controller.enable();
        controller.disable();
        settle().await;
        assert_invariant(&controller);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(fixture.journal.count_prefix("dispatch:"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_smart_confirm_enables_before_pass_through() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        controller.smart_confirm().await.unwrap();

        let entries = fixture.journal.entries();
        let status_at = entries.iter().position(|e| e == "status:on").unwrap();
        let type_at = entries
            .iter()
            .position(|e| e.starts_with("dispatch:default:type"))
            .unwrap();
        assert!(status_at < type_at);
        assert!(controller.is_enabled());
        assert_invariant(&controller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_smart_confirm_when_enabled_only_passes_through() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");
        controller.enable();
        fixture.journal.clear();

        controller.smart_confirm().await.unwrap();

        assert_eq!(fixture.journal.count_prefix("dispatch:default:type"), 1);
        assert_eq!(fixture.journal.count_prefix("status:"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_now_ignores_enabled_state() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");

        let report = controller.trigger_now().await;
        assert_eq!(report.attempts().len(), 5);
        assert_eq!(report.dispatched(), 2);
        assert!(!controller.is_enabled());
        assert_invariant(&controller);
        assert_eq!(
            fixture.journal.entries().last().map(String::as_str),
            Some("notify:Manual trigger executed")
        );

        controller.enable();
        controller.trigger_now().await;
        settle().await;
        assert!(controller.is_enabled());
        assert_invariant(&controller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timer_and_keeps_flag() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("w1");
        controller.enable();

        controller.shutdown();
        settle().await;

        assert!(!controller.is_loop_running());
        assert_eq!(controller.live_timer_tasks(), 0);
        assert_eq!(fixture.journal.entries().last().map(String::as_str), Some("status:hidden"));
        assert_eq!(fixture.storage.for_window("w1").get_flag(ENABLED_KEY).unwrap(), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_store_starts_disabled() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller_with_store(Arc::new(FailingStore));
        controller.activate();
        settle().await;

        assert!(!controller.is_enabled());
        assert_invariant(&controller);
        assert_eq!(fixture.journal.entries(), vec!["status:off"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_survives_store_write_failure() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller_with_store(Arc::new(FailingStore));

        controller.enable();
        settle().await;

        assert!(controller.is_enabled());
        assert_invariant(&controller);
        assert_eq!(
            fixture.journal.entries(),
            vec!["status:on", "notify:Auto Proceed ENABLED for this window"]
        );

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(fixture.journal.count_prefix("dispatch:"), 5);
    }
}
