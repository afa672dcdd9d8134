//! Echo process: replies with the request it was given.

use crate::error::ProcessResult;
use crate::processes::request::{RequestContext, RequestHandler, RequestProcess};
use mp_protocol::envelope::ForwardEnvelope;
use mp_protocol::fields;
use mp_protocol::message::{Message, SealedMessage};

/// Echo as a process unit.
pub type EchoProcess = RequestProcess<Echo>;

/// Copies the `request` block of each inbound message into its reply.
///
/// A message without a `request` block is echoed whole.
#[derive(Debug, Default)]
pub struct Echo {
    context: SealedMessage,
    reply: Option<Message>,
}

impl Echo {
    pub fn process() -> EchoProcess {
        RequestProcess::new(Self::default())
    }
}

impl RequestHandler for Echo {
    fn on_initialise(&mut self, _config: Option<&Message>) -> ProcessResult<()> {
        Ok(())
    }

    fn on_new_request(&mut self, request: &SealedMessage) -> ProcessResult<()> {
        self.context = request.clone();
        self.reply = None;
        Ok(())
    }

    fn has_forward_requests(&self) -> bool {
        false
    }

    fn build_requests(
        &mut self,
        _context: RequestContext<'_>,
    ) -> ProcessResult<Option<ForwardEnvelope>> {
        Ok(None)
    }

    fn on_reply(&mut self, _reply: &Message) -> ProcessResult<bool> {
        Ok(true)
    }

    fn on_process(&mut self) -> ProcessResult<()> {
        let reply = self
            .context
            .message(fields::REQUEST)
            .unwrap_or_else(|| self.context.to_message());
        self.reply = Some(reply);
        Ok(())
    }

    fn has_further_work(&self) -> ProcessResult<bool> {
        Ok(self.reply.is_none())
    }

    fn build_reply(&self) -> ProcessResult<Message> {
        Ok(self.message_data())
    }

    fn message_data(&self) -> Message {
        let mut data = self.context.to_message();
        if let Some(reply) = &self.reply {
            data.put(fields::REPLY, reply.clone());
        }
        data
    }
}
