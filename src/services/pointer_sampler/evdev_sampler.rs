use crate::config::InputConfig;
use crate::error::Result;
use crate::events::Sample;
use crate::swipe_error;
use crate::utils::DeviceFinder;
use evdev::{AbsoluteAxisCode, Device, EventType, InputEvent, KeyCode, RelativeAxisCode};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::pointer_state::{PointerState, PointerUpdate};
use super::r#trait::PointerSampler;

// errno, с которым ядро отвечает на чтение отключённого устройства
const ENODEV: i32 = 19;

const READ_RETRY_BASE: Duration = Duration::from_millis(100);
const READ_RETRY_MAX: Duration = Duration::from_secs(2);
const MAX_READ_FAILURES: u32 = 10;

const RESCAN_BASE: Duration = Duration::from_secs(1);
const RESCAN_MAX: Duration = Duration::from_secs(30);

/// Сэмплер на evdev: по потоку чтения на устройство, общий снимок состояния
pub struct EvdevPointerSampler {
    readers: Arc<Readers>,
}

impl EvdevPointerSampler {
    pub fn new(input: &InputConfig) -> Result<Self> {
        info!("Инициализация EvdevPointerSampler");

        let readers = Arc::new(Readers::new(input.screen_height));
        for path in DeviceFinder::find_pointer_devices(&input.device_path)? {
            readers.attach(path);
        }

        if readers.state.lock().live_readers() == 0 {
            return Err(swipe_error!(device_not_found, "Не удалось открыть ни одно устройство-указатель"));
        }

        let weak = Arc::downgrade(&readers);
        let device_path = input.device_path.clone();
        thread::Builder::new()
            .name("pointer-rescan".to_string())
            .spawn(move || supervise(weak, device_path))?;

        Ok(Self { readers })
    }
}

impl PointerSampler for EvdevPointerSampler {
    fn sample(&mut self) -> Result<Sample> {
        let state = self.readers.state.lock();
        if state.live_readers() == 0 {
            return Err(swipe_error!(platform_query, "все устройства-указатели недоступны"));
        }
        Ok(Sample::now(state.y(), state.button_down()))
    }
}

/// Общие данные потоков чтения и потока переподключения
struct Readers {
    state: Mutex<PointerState>,
    // Открытые пути и номера их источников
    attached: Mutex<HashMap<PathBuf, usize>>,
    next_source: AtomicUsize,
    // Отключённые устройства, которым ещё не нашлась замена
    lost: AtomicUsize,
}

impl Readers {
    fn new(screen_height: u32) -> Self {
        Self {
            state: Mutex::new(PointerState::new(screen_height)),
            attached: Mutex::new(HashMap::new()),
            next_source: AtomicUsize::new(0),
            lost: AtomicUsize::new(0),
        }
    }

    /// Открыть устройство и запустить поток чтения; false, если уже открыто или не открылось
    fn attach(self: &Arc<Self>, path: PathBuf) -> bool {
        if self.attached.lock().contains_key(&path) {
            return false;
        }

        let device = match Device::open(&path) {
            Ok(device) => device,
            Err(e) => {
                warn!("Устройство {:?} пропущено: {}", path, e);
                return false;
            }
        };

        let source = self.next_source.fetch_add(1, Ordering::Relaxed);
        let abs_range = abs_y_range(&device);
        let name = device.name().unwrap_or("Unknown").to_string();

        info!("Чтение указателя {} ({:?}), ABS_Y: {:?}", name, path, abs_range);

        self.attached.lock().insert(path.clone(), source);
        self.state.lock().reader_started(source);

        let readers = Arc::clone(self);
        let thread_path = path.clone();
        let spawned = thread::Builder::new()
            .name(format!("pointer-reader-{}", source))
            .spawn(move || readers.read_loop(device, source, &thread_path, &name, abs_range));

        if let Err(e) = spawned {
            error!("Не удалось запустить поток чтения {:?}: {}", path, e);
            self.detach(&path, source);
            return false;
        }

        true
    }

    fn read_loop(
        &self,
        mut device: Device,
        source: usize,
        path: &Path,
        name: &str,
        abs_range: Option<(i32, i32)>,
    ) {
        let mut failures = 0u32;

        loop {
            match device.fetch_events() {
                Ok(events) => {
                    failures = 0;
                    let updates: SmallVec<[PointerUpdate; 8]> =
                        events.filter_map(|event| decode(&event, abs_range)).collect();

                    if !updates.is_empty() {
                        let mut state = self.state.lock();
                        for update in updates {
                            state.apply(source, update);
                        }
                    }
                }
                Err(e) if is_device_gone(&e) => {
                    warn!("Устройство {} ({:?}) отключено", name, path);
                    break;
                }
                Err(e) => {
                    failures += 1;
                    if failures >= MAX_READ_FAILURES {
                        error!("Устройство {} не читается {} раз подряд, переоткрываем: {}", name, failures, e);
                        break;
                    }

                    let delay = retry_delay(READ_RETRY_BASE, READ_RETRY_MAX, failures);
                    error!("Ошибка чтения событий {}: {}, повтор через {:?}", name, e, delay);
                    thread::sleep(delay);
                }
            }
        }

        self.detach(path, source);
        self.lost.fetch_add(1, Ordering::Relaxed);
    }

    fn detach(&self, path: &Path, source: usize) {
        self.attached.lock().remove(path);
        self.state.lock().reader_failed(source);
    }
}

/// Переподключение отключённых устройств с нарастающей паузой между поисками
fn supervise(weak: Weak<Readers>, device_path: String) {
    let mut delay = RESCAN_BASE;

    loop {
        thread::sleep(delay);

        let Some(readers) = weak.upgrade() else {
            return;
        };

        let lost = readers.lost.load(Ordering::Relaxed);
        if lost == 0 {
            delay = RESCAN_BASE;
            continue;
        }

        let found = DeviceFinder::find_pointer_devices(&device_path).unwrap_or_else(|e| {
            debug!("Устройства-указатели пока не найдены: {}", e);
            Vec::new()
        });

        let reattached = found.into_iter().filter(|path| readers.attach(path.clone())).count();

        if reattached > 0 {
            info!("Переподключено устройств-указателей: {}", reattached);
            let _ = readers
                .lost
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |lost| {
                    Some(lost.saturating_sub(reattached))
                });
            delay = RESCAN_BASE;
        } else {
            delay = (delay * 2).min(RESCAN_MAX);
        }
    }
}

fn abs_y_range(device: &Device) -> Option<(i32, i32)> {
    let axes = device.supported_absolute_axes()?;
    if !axes.contains(AbsoluteAxisCode::ABS_Y) {
        return None;
    }

    device
        .get_absinfo()
        .ok()?
        .find(|(axis, _)| *axis == AbsoluteAxisCode::ABS_Y)
        .map(|(_, info)| (info.minimum(), info.maximum()))
}

fn is_device_gone(e: &io::Error) -> bool {
    e.raw_os_error() == Some(ENODEV)
}

/// Пауза перед попыткой `attempt` (с 1): удваивается от `base` до `max`
fn retry_delay(base: Duration, max: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent).min(max)
}

/// Извлечь из события evdev изменение кнопки или вертикальной координаты
fn decode(event: &InputEvent, abs_range: Option<(i32, i32)>) -> Option<PointerUpdate> {
    let event_type = event.event_type();
    let code = event.code();

    if event_type == EventType::KEY
        && (code == KeyCode::BTN_LEFT.code() || code == KeyCode::BTN_TOUCH.code())
    {
        return match event.value() {
            0 => Some(PointerUpdate::Button(false)),
            1 => Some(PointerUpdate::Button(true)),
            _ => None,
        };
    }

    if event_type == EventType::RELATIVE && code == RelativeAxisCode::REL_Y.0 {
        return Some(PointerUpdate::RelativeY(event.value()));
    }

    if event_type == EventType::ABSOLUTE && code == AbsoluteAxisCode::ABS_Y.0 {
        return abs_range.map(|(min, max)| PointerUpdate::AbsoluteY {
            value: event.value(),
            min,
            max,
        });
    }

    None
}
