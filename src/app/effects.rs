use crate::app::{App, Model};
use crate::remote::Remote;

impl<R: Remote> App<R> {
    /// Route requests queued by `update` to the collaborator.
    ///
    /// Full-state requests wait in the coalescer. Any other request first
    /// releases everything waiting, so the collaborator sees edits in the
    /// order they were made.
    pub(super) fn handle_message_side_effects(&mut self, model: &mut Model, now_ms: u64) {
        for (ticket, request) in model.take_outbox() {
            if request.coalesce_key().is_some() {
                if let Some(older) = self.coalescer.queue(ticket, request, now_ms) {
                    model.supersede(older, ticket);
                }
                continue;
            }
            for (held, waiting) in self.coalescer.flush() {
                self.remote.submit(held, waiting);
            }
            self.remote.submit(ticket, request);
        }
    }
}
