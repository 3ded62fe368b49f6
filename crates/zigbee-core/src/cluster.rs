//! ZCL (Zigbee Cluster Library) identifiers used by the device profiles

/// Common ZCL cluster IDs
pub mod id {
    // General Clusters
    pub const BASIC: u16 = 0x0000;
    pub const POWER_CONFIG: u16 = 0x0001;
    pub const ON_OFF: u16 = 0x0006;

    // Measurement Clusters
    pub const TEMPERATURE_MEASUREMENT: u16 = 0x0402;
    pub const HUMIDITY_MEASUREMENT: u16 = 0x0405;

    // Smart Energy
    pub const METERING: u16 = 0x0702;
    pub const ELECTRICAL_MEASUREMENT: u16 = 0x0B04;

    // Manufacturer-specific
    pub const LUMI_PRIVATE: u16 = 0xFCC0;
}

/// Manufacturer codes
pub mod manufacturer {
    pub const LUMI: u16 = 0x115F;
}

/// Basic cluster attributes
pub mod basic_attrs {
    /// Legacy vendor status report carried as a tag-type-value stream
    pub const LUMI_STATUS: u16 = 0xFF01;
}

/// Power Configuration cluster attributes
pub mod power_config_attrs {
    pub const BATTERY_PERCENTAGE_REMAINING: u16 = 0x0021;
}

/// On/Off cluster attributes
pub mod on_off_attrs {
    pub const ON_OFF: u16 = 0x0000;
}

/// Attributes shared by the measurement clusters
pub mod measurement_attrs {
    pub const MEASURED_VALUE: u16 = 0x0000;
}

/// Metering cluster attributes
pub mod metering_attrs {
    pub const CURRENT_SUMMATION_DELIVERED: u16 = 0x0000;
    pub const MULTIPLIER: u16 = 0x0301;
    pub const DIVISOR: u16 = 0x0302;
}

/// Electrical Measurement cluster attributes
pub mod electrical_attrs {
    pub const RMS_VOLTAGE: u16 = 0x0505;
    pub const RMS_CURRENT: u16 = 0x0508;
    pub const ACTIVE_POWER: u16 = 0x050B;
    pub const AC_VOLTAGE_MULTIPLIER: u16 = 0x0600;
    pub const AC_VOLTAGE_DIVISOR: u16 = 0x0601;
    pub const AC_CURRENT_MULTIPLIER: u16 = 0x0602;
    pub const AC_CURRENT_DIVISOR: u16 = 0x0603;
    pub const AC_POWER_MULTIPLIER: u16 = 0x0604;
    pub const AC_POWER_DIVISOR: u16 = 0x0605;
}

/// Lumi private cluster attributes
pub mod lumi_attrs {
    /// Vendor status report carried as a tag-type-value stream
    pub const STATUS_REPORT: u16 = 0x00F7;
}
