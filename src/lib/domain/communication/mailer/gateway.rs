//! Mail dispatch gateway

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

use crate::domain::settings::ConfigSource;

use super::{
    errors::MailerError,
    message::{MailPayload, Message},
    sender::SenderDefaults,
    transport::{DeliveryResult, Transport, TransportFactory},
    Mailer,
};

/// Sends messages through a lazily built, process-wide transport.
///
/// The transport is built on the first send and reused afterwards. A failed
/// build is not remembered: the next send tries again with whatever the
/// settings hold by then.
pub struct MailGateway<F: TransportFactory> {
    factory: F,
    config: Arc<dyn ConfigSource>,
    senders: SenderDefaults,
    transport: OnceCell<F::Transport>,
}

impl<F: TransportFactory> MailGateway<F> {
    /// Create a new gateway. Nothing is built until the first send.
    pub fn new(factory: F, config: Arc<dyn ConfigSource>, senders: SenderDefaults) -> Self {
        Self {
            factory,
            config,
            senders,
            transport: OnceCell::new(),
        }
    }

    /// Whether the transport has been built yet.
    pub fn is_ready(&self) -> bool {
        self.transport.initialized()
    }

    async fn transport(&self) -> Result<&F::Transport, MailerError> {
        self.transport
            .get_or_try_init(|| async {
                debug!("building mail transport");

                self.factory
                    .build(self.config.as_ref())
                    .inspect_err(|err| warn!("{err}"))
            })
            .await
    }
}

#[async_trait]
impl<F: TransportFactory> Mailer for MailGateway<F> {
    async fn send_mail(&self, message: &Message) -> Result<DeliveryResult, MailerError> {
        let transport = self.transport().await?;

        let from = self.senders.resolve(self.config.as_ref());
        let payload = MailPayload::new(from, message);

        debug!(to = %payload.to, subject = %payload.subject, "sending email");

        transport
            .deliver(&payload)
            .await
            .inspect_err(|err| error!("email send failed: {err}"))
    }
}

impl<F: TransportFactory> fmt::Debug for MailGateway<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailGateway")
            .field("config", &self.config)
            .field("senders", &self.senders)
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use testresult::TestResult;

    use crate::{
        domain::communication::mailer::{
            sender::{FROM_EMAIL, NODE_ENV},
            transport::Transport,
            Body, Recipients,
        },
        infrastructure::config::MapConfig,
    };

    use super::*;

    const API_KEY: &str = "TEST_API_KEY";

    #[derive(Clone, Copy, Debug)]
    enum Outcome {
        Accept,
        Raise,
        Reject,
    }

    #[derive(Debug)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<MailPayload>>>,
        outcome: Outcome,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn deliver(&self, payload: &MailPayload) -> Result<DeliveryResult, MailerError> {
            self.sent
                .lock()
                .map_err(|_| MailerError::rejected("poisoned"))?
                .push(payload.clone());

            match self.outcome {
                Outcome::Accept => Ok(DeliveryResult::Api {
                    id: "msg-1".to_string(),
                }),
                Outcome::Raise => Err(MailerError::failed(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                ))),
                Outcome::Reject => Err(MailerError::rejected("x")),
            }
        }
    }

    #[derive(Debug)]
    struct CountingFactory {
        builds: Arc<AtomicUsize>,
        sent: Arc<Mutex<Vec<MailPayload>>>,
        outcome: Outcome,
    }

    impl CountingFactory {
        fn new(outcome: Outcome) -> Self {
            Self {
                builds: Arc::new(AtomicUsize::new(0)),
                sent: Arc::new(Mutex::new(Vec::new())),
                outcome,
            }
        }
    }

    impl TransportFactory for CountingFactory {
        type Transport = RecordingTransport;

        fn build(&self, config: &dyn ConfigSource) -> Result<RecordingTransport, MailerError> {
            config
                .get_non_empty(API_KEY)
                .ok_or_else(|| MailerError::configuration("TEST_API_KEY is not set"))?;

            self.builds.fetch_add(1, Ordering::SeqCst);

            Ok(RecordingTransport {
                sent: self.sent.clone(),
                outcome: self.outcome,
            })
        }
    }

    fn message() -> Message {
        Message::new("a@x.com", "S", Body::Text("T".to_string()))
    }

    #[tokio::test]
    async fn test_transport_is_built_once() -> TestResult {
        let factory = CountingFactory::new(Outcome::Accept);
        let builds = factory.builds.clone();
        let sent = factory.sent.clone();

        let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key")]));
        let gateway = MailGateway::new(factory, config, SenderDefaults::default());

        assert!(!gateway.is_ready());

        for _ in 0..5 {
            gateway.send_mail(&message()).await?;
        }

        assert!(gateway.is_ready());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(sent.lock().map(|sent| sent.len()).unwrap_or_default(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_first_sends_share_one_transport() -> TestResult {
        let factory = CountingFactory::new(Outcome::Accept);
        let builds = factory.builds.clone();

        let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key")]));
        let gateway = Arc::new(MailGateway::new(
            factory,
            config,
            SenderDefaults::default(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = gateway.clone();
                tokio::spawn(async move { gateway.send_mail(&message()).await })
            })
            .collect();

        for handle in handles {
            handle.await??;
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_credentials_are_retried_on_next_send() -> TestResult {
        let factory = CountingFactory::new(Outcome::Accept);
        let builds = factory.builds.clone();

        let config = Arc::new(MapConfig::default());
        let gateway = MailGateway::new(factory, config.clone(), SenderDefaults::default());

        let result = gateway.send_mail(&message()).await;

        assert!(matches!(
            result,
            Err(MailerError::TransportConfiguration(_))
        ));
        assert!(!gateway.is_ready());

        config.set(API_KEY, "late-injected-secret");

        let result = gateway.send_mail(&message()).await?;

        assert_eq!(
            result,
            DeliveryResult::Api {
                id: "msg-1".to_string()
            }
        );
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_payload_is_passed_through() -> TestResult {
        let factory = CountingFactory::new(Outcome::Accept);
        let sent = factory.sent.clone();

        let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key")]));
        let gateway = MailGateway::new(factory, config, SenderDefaults::default());

        gateway.send_mail(&message()).await?;

        let sent = sent.lock().map(|sent| sent.clone()).unwrap_or_default();

        assert_eq!(
            sent,
            vec![MailPayload {
                from: "no-reply@localhost".to_string(),
                to: Recipients::One("a@x.com".to_string()),
                subject: "S".to_string(),
                text: Some("T".to_string()),
                html: None,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_sender_is_resolved_on_every_send() -> TestResult {
        let factory = CountingFactory::new(Outcome::Accept);
        let sent = factory.sent.clone();

        let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key"), (NODE_ENV, "production")]));
        let gateway = MailGateway::new(factory, config.clone(), SenderDefaults::default());

        gateway.send_mail(&message()).await?;

        config.set(FROM_EMAIL, "bookings@salon.test");

        gateway.send_mail(&message()).await?;

        let senders: Vec<String> = sent
            .lock()
            .map(|sent| sent.iter().map(|payload| payload.from.clone()).collect())
            .unwrap_or_default();

        assert_eq!(senders, vec!["no-reply@example.com", "bookings@salon.test"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_raised_and_returned_errors_surface_the_same_kind() -> TestResult {
        for outcome in [Outcome::Raise, Outcome::Reject] {
            let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key")]));
            let gateway = MailGateway::new(
                CountingFactory::new(outcome),
                config,
                SenderDefaults::default(),
            );

            let result = gateway.send_mail(&message()).await;

            assert!(
                matches!(result, Err(MailerError::DeliverySend { .. })),
                "{outcome:?} should surface as a delivery error"
            );
        }

        let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key")]));
        let gateway = MailGateway::new(
            CountingFactory::new(Outcome::Reject),
            config,
            SenderDefaults::default(),
        );

        match gateway.send_mail(&message()).await {
            Err(MailerError::DeliverySend { message, .. }) => assert_eq!(message, "x"),
            other => panic!("unexpected result: {other:?}"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_send_keeps_transport() -> TestResult {
        let factory = CountingFactory::new(Outcome::Raise);
        let builds = factory.builds.clone();

        let config = Arc::new(MapConfig::from_pairs([(API_KEY, "key")]));
        let gateway = MailGateway::new(factory, config, SenderDefaults::default());

        assert!(gateway.send_mail(&message()).await.is_err());
        assert!(gateway.send_mail(&message()).await.is_err());

        assert!(gateway.is_ready());
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        Ok(())
    }
}
