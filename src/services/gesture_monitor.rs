use crate::error::{Result, SwipeError};
use crate::events::GestureTriggered;
use crate::services::action_dispatcher::{ActionDispatcher, DispatchOutcome};
use crate::services::config_provider::ConfigProvider;
use crate::services::gesture_detector::GestureDetector;
use crate::services::notifier::OperatorNotifier;
use crate::services::pointer_sampler::PointerSampler;
use crate::trace_if_enabled;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Фоновый цикл: опрос указателя -> детектор -> действие
pub struct GestureMonitor {
    sampler: Box<dyn PointerSampler + Send>,
    detector: GestureDetector,
    dispatcher: ActionDispatcher,
    config_provider: Arc<ConfigProvider>,
    notifier: Arc<dyn OperatorNotifier>,
    tick: Duration,
}

impl GestureMonitor {
    pub fn new(
        sampler: Box<dyn PointerSampler + Send>,
        detector: GestureDetector,
        dispatcher: ActionDispatcher,
        config_provider: Arc<ConfigProvider>,
        notifier: Arc<dyn OperatorNotifier>,
        tick: Duration,
    ) -> Self {
        Self {
            sampler,
            detector,
            dispatcher,
            config_provider,
            notifier,
            tick,
        }
    }

    /// Крутится до сигнала завершения; отдельный тик или действие цикл не останавливают
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let thresholds = self.detector.thresholds();
        info!(
            "GestureMonitor запущен: тик {}мс, край {}px, порог {}px, кулдаун {}мс",
            self.tick.as_millis(),
            thresholds.top_tolerance,
            thresholds.drag_threshold,
            thresholds.cooldown.as_millis()
        );

        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            self.tick_once().await;
        }

        info!("GestureMonitor остановлен");
        Ok(())
    }

    /// Один тик цикла; возвращает срабатывание, если оно было
    pub async fn tick_once(&mut self) -> Option<GestureTriggered> {
        let sample = match self.sampler.sample() {
            Ok(sample) => sample,
            Err(e) => {
                // Опрос по мере возможности: пропуск тика не стоит шума в журнале
                trace_if_enabled!("Тик пропущен: {}", e);
                return None;
            }
        };

        let trigger = self.detector.observe(&sample)?;
        info!("Жест распознан: {}", trigger);

        Self::run_action(&self.dispatcher, &self.config_provider, &self.notifier).await;
        Some(trigger)
    }

    // Принимает поля по отдельности: сэмплер не Sync, а future должен быть Send
    async fn run_action(
        dispatcher: &ActionDispatcher,
        config_provider: &ConfigProvider,
        notifier: &Arc<dyn OperatorNotifier>,
    ) {
        let action = match config_provider.get_action_config() {
            Ok(action) => action,
            Err(SwipeError::ConfigUnavailable) => {
                debug!("Действие не настроено, жест проигнорирован");
                return;
            }
            Err(e) => {
                Self::report(notifier, "Ошибка конфигурации", e);
                return;
            }
        };

        match dispatcher.dispatch(&action).await {
            Ok(DispatchOutcome::Skipped) => debug!("Действие пропущено: путь к программе пуст"),
            Ok(outcome) => debug!("Действие выполнено: {:?}", outcome),
            Err(e) => Self::report(notifier, "Не удалось выполнить действие", e),
        }
    }

    /// Уведомление уходит в отдельную задачу: зависший получатель не держит опрос
    fn report(notifier: &Arc<dyn OperatorNotifier>, summary: &'static str, e: SwipeError) {
        let notifier = Arc::clone(notifier);
        let body = e.to_string();
        tokio::spawn(async move {
            notifier.notify(summary, &body).await;
        });
    }
}
