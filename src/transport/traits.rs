//! Link transport trait for abstraction and testability
//!
//! The session talks to the unit through this narrow contract, so the BLE
//! backend can be swapped with a mock for testing.

use core::future::Future;

use thiserror::Error;

/// Callback receiving every inbound notification value
pub type NotificationHandler = Box<dyn Fn(&[u8]) + Send + Sync>;

/// Errors that can occur on the link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link dropped or was never established
    #[error("link lost")]
    LinkLost,

    /// Operation timed out
    #[error("operation timed out")]
    Timeout,

    /// Required characteristic missing on the peer
    #[error("characteristic not found")]
    CharacteristicNotFound,

    /// Peer could not be found
    #[error("device not found")]
    DeviceNotFound,

    /// Any other backend failure
    #[error("transport backend: {0}")]
    Backend(String),
}

/// Abstract link to one unit
pub trait Transport {
    /// Open the link
    fn connect(&mut self) -> impl Future<Output = Result<(), TransportError>>;

    /// Close the link
    fn disconnect(&mut self) -> impl Future<Output = Result<(), TransportError>>;

    /// Write one complete frame
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Route inbound notifications to `handler`
    ///
    /// The handler may be invoked from any thread, concurrently with writes.
    fn subscribe(
        &mut self,
        handler: NotificationHandler,
    ) -> impl Future<Output = Result<(), TransportError>>;
}

#[cfg(test)]
pub mod mock {
    //! Mock transport for testing

    use super::*;
    use core::pin::Pin;
    use core::task::{Context, Poll};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockState {
        connected: bool,
        /// Every byte written, in wire order
        wire: Vec<u8>,
        /// One entry per completed write
        writes: Vec<Vec<u8>>,
        handler: Option<Arc<NotificationHandler>>,
        next_connect_error: Option<TransportError>,
        next_subscribe_error: Option<TransportError>,
        next_write_error: Option<TransportError>,
        next_disconnect_error: Option<TransportError>,
        connect_calls: usize,
    }

    /// Mock transport for unit testing
    ///
    /// Clones share state, so a test can keep a handle after moving the
    /// transport into a session.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        /// Create a new mock transport
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_connected(&self) -> bool {
            self.state.lock().unwrap().connected
        }

        pub fn connect_calls(&self) -> usize {
            self.state.lock().unwrap().connect_calls
        }

        /// Frames written so far, one entry per write
        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.state.lock().unwrap().writes.clone()
        }

        /// Raw byte stream written so far
        pub fn wire(&self) -> Vec<u8> {
            self.state.lock().unwrap().wire.clone()
        }

        pub fn has_handler(&self) -> bool {
            self.state.lock().unwrap().handler.is_some()
        }

        /// The subscribed handler, held as an in-flight delivery would hold it
        pub fn handler(&self) -> Option<Arc<NotificationHandler>> {
            self.state.lock().unwrap().handler.clone()
        }

        /// Set an error to be returned by the next connect() call
        pub fn set_next_connect_error(&self, error: TransportError) {
            self.state.lock().unwrap().next_connect_error = Some(error);
        }

        /// Set an error to be returned by the next subscribe() call
        pub fn set_next_subscribe_error(&self, error: TransportError) {
            self.state.lock().unwrap().next_subscribe_error = Some(error);
        }

        /// Set an error to be returned by the next write() call
        pub fn set_next_write_error(&self, error: TransportError) {
            self.state.lock().unwrap().next_write_error = Some(error);
        }

        /// Set an error to be returned by the next disconnect() call
        pub fn set_next_disconnect_error(&self, error: TransportError) {
            self.state.lock().unwrap().next_disconnect_error = Some(error);
        }

        /// Push a notification through the subscribed handler
        ///
        /// The state lock is released before the handler runs.
        pub fn deliver(&self, data: &[u8]) {
            if let Some(handler) = self.handler() {
                handler(data);
            }
        }
    }

    impl Transport for MockTransport {
        async fn connect(&mut self) -> Result<(), TransportError> {
            let mut state = self.state.lock().unwrap();
            state.connect_calls += 1;
            if let Some(error) = state.next_connect_error.take() {
                return Err(error);
            }
            state.connected = true;
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<(), TransportError> {
            let mut state = self.state.lock().unwrap();
            state.connected = false;
            state.handler = None;
            match state.next_disconnect_error.take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
            {
                let mut state = self.state.lock().unwrap();
                if let Some(error) = state.next_write_error.take() {
                    return Err(error);
                }
                if !state.connected {
                    return Err(TransportError::LinkLost);
                }
            }

            // Write in two halves with a suspension point in between so
            // unserialised callers would interleave
            let (first, second) = data.split_at(data.len() / 2);
            self.state.lock().unwrap().wire.extend_from_slice(first);
            YieldNow(false).await;
            let mut state = self.state.lock().unwrap();
            state.wire.extend_from_slice(second);
            state.writes.push(data.to_vec());
            Ok(())
        }

        async fn subscribe(&mut self, handler: NotificationHandler) -> Result<(), TransportError> {
            let mut state = self.state.lock().unwrap();
            if let Some(error) = state.next_subscribe_error.take() {
                return Err(error);
            }
            state.handler = Some(Arc::new(handler));
            Ok(())
        }
    }

    /// Returns `Pending` once, waking itself
    struct YieldNow(bool);

    impl core::future::Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[test]
        fn test_mock_write() {
            let mut transport = MockTransport::new();

            futures::executor::block_on(async {
                transport.connect().await.unwrap();
                transport.write(&[0x01, 0x02]).await.unwrap();
                transport.write(&[0x03, 0x04, 0x05]).await.unwrap();
            });

            assert_eq!(transport.writes(), vec![vec![0x01, 0x02], vec![0x03, 0x04, 0x05]]);
            assert_eq!(transport.wire(), vec![0x01, 0x02, 0x03, 0x04, 0x05]);
        }

        #[test]
        fn test_mock_write_requires_connection() {
            let mut transport = MockTransport::new();
            let result = futures::executor::block_on(transport.write(&[0x01]));
            assert_eq!(result, Err(TransportError::LinkLost));
        }

        #[test]
        fn test_mock_write_error_cleared() {
            let mut transport = MockTransport::new();

            futures::executor::block_on(async {
                transport.connect().await.unwrap();
                transport.set_next_write_error(TransportError::Timeout);

                assert_eq!(transport.write(&[0x01]).await, Err(TransportError::Timeout));
                assert!(transport.write(&[0x01]).await.is_ok());
            });
        }

        #[test]
        fn test_mock_deliver() {
            let mut transport = MockTransport::new();
            let received = Arc::new(AtomicUsize::new(0));
            let counter = received.clone();

            futures::executor::block_on(async {
                transport
                    .subscribe(Box::new(move |data: &[u8]| {
                        counter.fetch_add(data.len(), Ordering::SeqCst);
                    }))
                    .await
                    .unwrap();
            });

            transport.deliver(&[1, 2, 3]);
            assert_eq!(received.load(Ordering::SeqCst), 3);
        }
    }
}
