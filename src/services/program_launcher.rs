use crate::error::Result;
use crate::swipe_error;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Capability to start an external program without waiting for it
pub trait ProgramLauncher: Send + Sync {
    /// Start `program` with `args`, returning the child pid
    fn launch(&self, program: &str, args: &[String]) -> Result<u32>;
}

/// Разобрать строку запуска: существующий файл целиком, иначе по правилам shell
pub fn split_command_line(command_line: &str) -> Result<(String, Vec<String>)> {
    let trimmed = command_line.trim();

    if Path::new(trimmed).is_file() {
        return Ok((trimmed.to_string(), Vec::new()));
    }

    let mut parts = shlex::split(trimmed)
        .ok_or_else(|| swipe_error!(dispatch, "не удалось разобрать строку запуска '{}'", trimmed))?
        .into_iter();

    let program = parts
        .next()
        .ok_or_else(|| swipe_error!(dispatch, "пустая строка запуска"))?;

    Ok((program, parts.collect()))
}

/// Запуск через std::process::Command, процесс отвязан от демона
pub struct ProcessLauncher {
    dry_run: bool,
}

impl ProcessLauncher {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl ProgramLauncher for ProcessLauncher {
    fn launch(&self, program: &str, args: &[String]) -> Result<u32> {
        if self.dry_run {
            info!("[DRY RUN] Запуск программы: {} {:?}", program, args);
            return Ok(0);
        }

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| swipe_error!(dispatch, "не удалось запустить '{}': {}", program, e))?;

        let pid = child.id();
        let program = program.to_string();

        // Забираем код завершения, чтобы не оставлять зомби
        std::thread::spawn(move || match child.wait() {
            Ok(status) => debug!("Программа {} (pid {}) завершилась: {}", program, pid, status),
            Err(e) => warn!("Не удалось дождаться завершения {} (pid {}): {}", program, pid, e),
        });

        Ok(pid)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Запоминает запуски; при fail = true каждый запуск завершается ошибкой
    #[derive(Default)]
    pub struct RecordingLauncher {
        launches: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    impl RecordingLauncher {
        pub fn failing() -> Self {
            Self {
                launches: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn launches(&self) -> Vec<(String, Vec<String>)> {
            self.launches.lock().clone()
        }
    }

    impl ProgramLauncher for RecordingLauncher {
        fn launch(&self, program: &str, args: &[String]) -> Result<u32> {
            self.launches.lock().push((program.to_string(), args.to_vec()));
            if self.fail {
                return Err(swipe_error!(dispatch, "'{}' не найдена", program));
            }
            Ok(4242)
        }
    }
}
