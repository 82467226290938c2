//! ESP-IDF MQTT client wrapper.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use esp_idf_svc::mqtt::client::{
    EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
use esp_idf_sys::EspError;
use log::{info, warn};

use crate::config::{MqttConfig, MQTT_RETRY_DELAY};

/// Stack for the connection event thread; it only flips a flag and logs.
const EVENT_THREAD_STACK: usize = 6 * 1024;

/// MQTT link to the broker.
///
/// The esp-idf client reconnects on its own at the configured fixed cadence;
/// this wrapper tracks the connection events so the main loop can gate
/// publishing on [`is_connected`](Self::is_connected).
pub struct MqttLink {
    client: EspMqttClient<'static>,
    connected: Arc<AtomicBool>,
}

impl MqttLink {
    /// Start the client against the configured broker.
    ///
    /// The broker URL and client id are passed to the driver exactly as
    /// configured. Connection establishment is asynchronous; watch
    /// [`is_connected`](Self::is_connected).
    pub fn connect(config: &MqttConfig) -> Result<Self, EspError> {
        let url = config.broker_url();
        let client_config = MqttClientConfiguration {
            client_id: Some(config.client_id.as_str()),
            reconnect_timeout: Some(MQTT_RETRY_DELAY),
            ..Default::default()
        };

        let (client, connection) = EspMqttClient::new(&url, &client_config)?;

        let connected = Arc::new(AtomicBool::new(false));
        spawn_event_thread(connection, Arc::clone(&connected));

        info!("MQTT client started: {} as '{}'", url, config.client_id);
        Ok(Self { client, connected })
    }

    /// Whether the broker connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Publish a payload at QoS 0, no retain.
    pub fn publish(&mut self, topic: &str, payload: &str) -> Result<(), EspError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes())?;
        Ok(())
    }
}

/// Drain the connection event stream, tracking connect/disconnect.
///
/// The esp-idf client stalls if its connection object is not serviced, so
/// this thread must run for the client's whole lifetime.
fn spawn_event_thread(mut connection: EspMqttConnection, connected: Arc<AtomicBool>) {
    let result = thread::Builder::new()
        .name("mqtt-events".into())
        .stack_size(EVENT_THREAD_STACK)
        .spawn(move || loop {
            match connection.next() {
                Ok(event) => match event.payload() {
                    EventPayload::Connected(_) => {
                        connected.store(true, Ordering::Relaxed);
                        info!("MQTT connected");
                    }
                    EventPayload::Disconnected => {
                        connected.store(false, Ordering::Relaxed);
                        warn!("MQTT disconnected, driver will retry");
                    }
                    EventPayload::Error(e) => {
                        warn!("MQTT error: {:?}", e);
                    }
                    _ => {}
                },
                Err(e) => {
                    connected.store(false, Ordering::Relaxed);
                    warn!("MQTT connection stream closed: {:?}", e);
                    break;
                }
            }
        });

    if let Err(e) = result {
        warn!("Failed to spawn MQTT event thread: {}", e);
    }
}
