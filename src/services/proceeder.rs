use crate::debug_if_enabled;
use crate::services::CommandHost;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{info, trace};

/// Результат одной попытки выполнить команду
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Dispatched,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAttempt {
    pub command: String,
    pub outcome: CommandOutcome,
}

/// Отчёт одного прохода по списку команд, в порядке списка
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    attempts: SmallVec<[CommandAttempt; 8]>,
}

impl DispatchReport {
    #[allow(dead_code)]
    pub fn attempts(&self) -> &[CommandAttempt] {
        &self.attempts
    }

    pub fn dispatched(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == CommandOutcome::Dispatched)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempts.len() - self.dispatched()
    }
}

/// Проход по фиксированному списку команд.
///
/// Все проходы (по таймеру и ручные) идут через общий `gate`, поэтому два
/// прохода никогда не перемежаются.
#[derive(Clone)]
pub struct CommandDispatcher {
    host: Arc<dyn CommandHost>,
    commands: Arc<[String]>,
    gate: Arc<Mutex<()>>,
}

impl CommandDispatcher {
    pub fn new(host: Arc<dyn CommandHost>, commands: Vec<String>) -> Self {
        Self {
            host,
            commands: commands.into(),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Последовательно пробует каждую команду; ошибки попадают в отчёт и
    /// никогда не выходят наружу.
    pub async fn tick(&self) -> DispatchReport {
        let _gate = self.gate.lock().await;
        let mut report = DispatchReport::default();

        for command in self.commands.iter() {
            let outcome = match self.host.execute(command, None).await {
                Ok(()) => CommandOutcome::Dispatched,
                Err(e) => {
                    trace!("Команда {} пропущена: {}", command, e);
                    CommandOutcome::Failed(e.to_string())
                }
            };
            report.attempts.push(CommandAttempt {
                command: command.clone(),
                outcome,
            });
        }

        report
    }
}

/// Запущенный периодический цикл
struct RunningLoop {
    handle: JoinHandle<()>,
    stop: oneshot::Sender<()>,
    period: Duration,
}

/// Уменьшает счётчик живых задач при завершении или отмене задачи
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Периодический запуск [`CommandDispatcher::tick`].
///
/// Владеет не более чем одним таймером: `start` всегда сначала останавливает
/// предыдущий. Остановка мягкая: текущий тик доигрывается, новый не начинается.
pub struct ProceederLoop {
    dispatcher: CommandDispatcher,
    running: Option<RunningLoop>,
    live: Arc<AtomicUsize>,
}

impl ProceederLoop {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            dispatcher,
            running: None,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn start(&mut self, period: Duration) {
        self.stop();

        let (stop_tx, stop_rx) = oneshot::channel();
        let dispatcher = self.dispatcher.clone();

        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(Arc::clone(&self.live));

        let handle = tokio::spawn(async move {
            let _guard = guard;
            Self::run_loop(dispatcher, period, stop_rx).await;
        });

        self.running = Some(RunningLoop {
            handle,
            stop: stop_tx,
            period,
        });

        info!("Auto Proceed запущен с интервалом {}мс", period.as_millis());
    }

    /// Возвращает `true`, если таймер был активен
    pub fn stop(&mut self) -> bool {
        match self.running.take() {
            Some(running) => {
                // Задача могла уже завершиться сама, тогда приёмника нет
                let _ = running.stop.send(());
                info!("Auto Proceed остановлен");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    #[allow(dead_code)]
    pub fn period(&self) -> Option<Duration> {
        self.running.as_ref().map(|running| running.period)
    }

    /// Количество ещё не завершившихся задач таймера, включая доигрывающие тик
    #[allow(dead_code)]
    pub fn live_tasks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Один проход вне расписания; таймер не трогает
    pub async fn trigger_now(&self) -> DispatchReport {
        self.dispatcher.tick().await
    }

    async fn run_loop(dispatcher: CommandDispatcher, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
        // Первый тик через один интервал, а не сразу
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tick_count: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    tick_count += 1;
                    let report = dispatcher.tick().await;
                    debug_if_enabled!(
                        "Тик #{}: выполнено {}, пропущено {}",
                        tick_count,
                        report.dispatched(),
                        report.failed()
                    );
                }
            }
        }

        debug_if_enabled!("Цикл автоподтверждения завершён после {} тиков", tick_count);
    }
}

impl Drop for ProceederLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
