//! Metrik-Schnittstelle des Koordinators
//!
//! Der Koordinator kennt kein Prometheus; der Server verdrahtet eine
//! Implementierung, die in die Registry schreibt.

/// Empfaenger fuer Signaling-Zaehler
pub trait SignalingMetriken: Send + Sync + 'static {
    /// Ein eingehendes Ereignis wurde verarbeitet (`art` = Ereignistyp)
    fn ereignis(&self, art: &'static str);

    /// Ein ausgehendes Ereignis wurde verworfen
    fn verworfen(&self, grund: &'static str);
}

/// Implementierung ohne Wirkung (Tests, eingebettete Nutzung)
#[derive(Debug, Default, Clone, Copy)]
pub struct KeineMetriken;

impl SignalingMetriken for KeineMetriken {
    fn ereignis(&self, _art: &'static str) {}

    fn verworfen(&self, _grund: &'static str) {}
}

/// Verwerfungsgruende als stabile Label-Werte
pub mod grund {
    pub const ZIEL_NICHT_ERREICHBAR: &str = "ziel_nicht_erreichbar";
    pub const QUEUE_VOLL: &str = "queue_voll";
    pub const EMPFAENGER_NICHT_VERFUEGBAR: &str = "empfaenger_nicht_verfuegbar";
    pub const KEIN_PASSENDER_ANRUF: &str = "kein_passender_anruf";
    pub const PRESENCE: &str = "presence";
}
