pub mod channel;
pub mod config;
pub mod report;
pub mod subscription;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let definitions = system::definitions()
        .into_iter()
        .chain(channel::definitions())
        .chain(subscription::definitions())
        .chain(report::definitions())
        .chain(config::definitions());
    for entry in definitions {
        registry.register(entry);
    }
}
