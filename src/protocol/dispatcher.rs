//! Routes decoded messages to method handlers by name.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::protocol::binary::{
    self, exception, BinaryReader, MessageHeader, MessageKind, TType,
};

type MethodFn =
    dyn Fn(&MessageHeader, &mut BinaryReader) -> Result<Option<Vec<u8>>> + Send + Sync + 'static;

/// Method-name dispatch table shared across connections
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<String, Box<MethodFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register<F>(&self, method: &str, handler: F)
    where
        F: Fn(&MessageHeader, &mut BinaryReader) -> Result<Option<Vec<u8>>>
            + Send
            + Sync
            + 'static,
    {
        self.handlers
            .write()
            .unwrap()
            .insert(method.to_string(), Box::new(handler));
    }

    /// Routes one decoded call to its registered method handler
    ///
    /// Returns the encoded reply payload, or `None` when the call expects no
    /// reply. An unregistered method name consumes the argument struct and
    /// produces an unknown-method exception reply, so one bad call does not
    /// tear down the connection.
    ///
    /// # Errors
    /// Propagates decode failures from the argument stream; these leave the
    /// connection in an undefined state and abort it.
    pub fn dispatch(
        &self,
        header: &MessageHeader,
        reader: &mut BinaryReader,
    ) -> Result<Option<Vec<u8>>> {
        let handlers = self.handlers.read().unwrap();

        match handlers.get(&header.name) {
            Some(handler) => handler(header, reader),
            None => {
                reader.skip(TType::Struct)?;
                if header.kind == MessageKind::Oneway {
                    return Ok(None);
                }
                Ok(Some(binary::write_application_exception(
                    &header.name,
                    header.seq,
                    exception::UNKNOWN_METHOD,
                    &format!("invalid method name: '{}'", header.name),
                )))
            }
        }
    }
}
