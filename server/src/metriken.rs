//! Verdrahtung zwischen Koordinator und Prometheus-Registry

use advocall_observability::{AdvocallMetrics, Kennzahlen, KennzahlenQuelle};
use advocall_signaling::{Coordinator, SignalingMetriken};

/// Schreibt Signaling-Zaehler in die Prometheus-Registry
pub struct PrometheusSignalingMetriken(pub AdvocallMetrics);

impl SignalingMetriken for PrometheusSignalingMetriken {
    fn ereignis(&self, art: &'static str) {
        self.0.events_total.with_label_values(&[art]).inc();
    }

    fn verworfen(&self, grund: &'static str) {
        self.0.dropped_messages_total.with_label_values(&[grund]).inc();
    }
}

/// Liefert Health- und Gauge-Kennzahlen aus dem Koordinator
pub struct KoordinatorKennzahlen(pub Coordinator);

impl KennzahlenQuelle for KoordinatorKennzahlen {
    fn kennzahlen(&self) -> Kennzahlen {
        let statistik = self.0.statistik();
        Kennzahlen {
            sessions: statistik.sessions,
            max_sessions: self.0.config().max_sessions,
            aktive_anrufe: statistik.aktive_anrufe,
            teilnehmer: statistik.teilnehmer,
        }
    }
}
