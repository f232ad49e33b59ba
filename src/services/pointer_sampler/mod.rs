mod dry_pointer_sampler;
mod evdev_sampler;
mod pointer_state;
mod r#trait;

pub use self::r#trait::{create_pointer_sampler, PointerSampler};
