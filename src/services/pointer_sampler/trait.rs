use crate::config::Config;
use crate::error::Result;
use crate::events::Sample;

/// Source of pointer snapshots polled by the gesture monitor
pub trait PointerSampler {
    /// Read the instantaneous pointer position and primary button state
    fn sample(&mut self) -> Result<Sample>;
}

/// Factory function to create an appropriate pointer sampler based on the dry_run flag
pub fn create_pointer_sampler(
    config: &Config,
    dry_run: bool,
) -> Result<Box<dyn PointerSampler + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_pointer_sampler::DryRunPointerSampler::new(
            config.input.screen_height,
        )))
    } else {
        Ok(Box::new(super::evdev_sampler::EvdevPointerSampler::new(
            &config.input,
        )?))
    }
}
