//! Dataset-level unit surface
//!
//! A [`Dataset`] owns one registry. Construction binds the code units of the
//! simulation (and, for cosmological runs, the comoving units and `h`), after
//! which values are built with [`Dataset::quantity`] and [`Dataset::array`]
//! against that registry.

use ndarray::Ix0;
use serde::{Deserialize, Serialize};

use crate::array::{IntoPayload, Quantity, UnitArray, make_value_with};
use crate::binder::{CodeScales, bind_code_units, bind_cosmology};
use crate::dimension::Dimension;
use crate::error::Result;
use crate::registry::UnitRegistry;
use crate::unit::{Unit, UnitSpec};

fn default_omega_matter() -> f64 {
    0.3
}

fn default_omega_lambda() -> f64 {
    0.7
}

/// Cosmological parameters of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cosmology {
    /// Snapshot redshift
    pub redshift: f64,

    /// Dimensionless Hubble parameter (H0 / 100 km/s/Mpc)
    pub hubble_constant: f64,

    #[serde(default = "default_omega_matter")]
    pub omega_matter: f64,

    #[serde(default = "default_omega_lambda")]
    pub omega_lambda: f64,
}

impl Cosmology {
    pub fn new(redshift: f64, hubble_constant: f64) -> Self {
        Self {
            redshift,
            hubble_constant,
            omega_matter: default_omega_matter(),
            omega_lambda: default_omega_lambda(),
        }
    }

    /// Expansion factor `1 / (1 + z)`
    pub fn scale_factor(&self) -> f64 {
        1.0 / (1.0 + self.redshift)
    }

    /// Curvature density `1 - Ωm - ΩΛ`
    pub fn omega_curvature(&self) -> f64 {
        1.0 - self.omega_matter - self.omega_lambda
    }

    /// `E(z) = H(z) / H0` for a matter + Λ + curvature universe
    pub fn expansion_rate(&self) -> f64 {
        let zp1 = 1.0 + self.redshift;
        (self.omega_matter * zp1.powi(3) + self.omega_curvature() * zp1.powi(2) + self.omega_lambda)
            .sqrt()
    }

    /// Hubble parameter at the snapshot redshift, in `km/s/Mpc`
    pub fn hubble_parameter(&self, registry: &UnitRegistry) -> Result<Quantity> {
        make_value_with(
            100.0 * self.hubble_constant * self.expansion_rate(),
            "km/s/Mpc",
            registry,
        )
    }
}

/// Serializable description of a dataset's units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub scales: CodeScales,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosmology: Option<Cosmology>,
}

/// Magnitude-1 code-unit quantities
#[derive(Debug, Clone)]
struct CodeUnits {
    length: Quantity,
    mass: Quantity,
    time: Quantity,
    velocity: Quantity,
    density: Quantity,
    pressure: Quantity,
    temperature: Quantity,
    magnetic: Quantity,
}

impl CodeUnits {
    fn new(scales: &CodeScales, registry: &UnitRegistry) -> Self {
        let one = |symbol: &str, dimension: Dimension, factor: f64| {
            Quantity::from_value(1.0, Unit::atomic(symbol, dimension, factor, registry))
        };
        Self {
            length: one("code_length", Dimension::LENGTH, scales.length),
            mass: one("code_mass", Dimension::MASS, scales.mass),
            time: one("code_time", Dimension::TIME, scales.time),
            velocity: one("code_velocity", Dimension::VELOCITY, scales.velocity()),
            density: one("code_density", Dimension::DENSITY, scales.density()),
            pressure: one("code_pressure", Dimension::PRESSURE, scales.pressure()),
            temperature: one("code_temperature", Dimension::TEMPERATURE, scales.temperature()),
            magnetic: one("code_magnetic", Dimension::MAGNETIC_FIELD, scales.magnetic()),
        }
    }
}

/// A simulation snapshot's unit context
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    registry: UnitRegistry,
    scales: CodeScales,
    cosmology: Option<Cosmology>,
    units: CodeUnits,
}

impl Dataset {
    /// A non-cosmological dataset with the given code scales
    pub fn new(name: impl Into<String>, scales: CodeScales) -> Result<Self> {
        let name = name.into();
        let mut registry = UnitRegistry::new();
        bind_code_units(&mut registry, &scales)?;
        tracing::debug!(dataset = %name, "created dataset registry");
        let units = CodeUnits::new(&scales, &registry);
        Ok(Self {
            name,
            registry,
            scales,
            cosmology: None,
            units,
        })
    }

    /// A cosmological dataset with comoving units and `h` bound
    pub fn cosmological(
        name: impl Into<String>,
        scales: CodeScales,
        cosmology: Cosmology,
    ) -> Result<Self> {
        let mut dataset = Self::new(name, scales)?;
        dataset.set_cosmology(cosmology)?;
        Ok(dataset)
    }

    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        match config.cosmology {
            Some(cosmology) => Self::cosmological(config.name.clone(), config.scales, cosmology),
            None => Self::new(config.name.clone(), config.scales),
        }
    }

    /// Build from a JSON [`DatasetConfig`]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DatasetConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    /// The dataset's configuration
    pub fn config(&self) -> DatasetConfig {
        DatasetConfig {
            name: self.name.clone(),
            scales: self.scales,
            cosmology: self.cosmology,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn scales(&self) -> &CodeScales {
        &self.scales
    }

    pub fn cosmology(&self) -> Option<&Cosmology> {
        self.cosmology.as_ref()
    }

    /// `H(z)` in `km/s/Mpc`, or `None` for a non-cosmological dataset
    pub fn hubble_parameter(&self) -> Option<Result<Quantity>> {
        self.cosmology
            .map(|cosmology| cosmology.hubble_parameter(&self.registry))
    }

    // =========================================================================
    // Rebinding
    // =========================================================================

    /// Rebind the code units
    ///
    /// Values built earlier keep the old factors. On error the dataset is
    /// unchanged.
    pub fn set_code_units(&mut self, scales: CodeScales) -> Result<()> {
        tracing::debug!(dataset = %self.name, "rebinding code units");
        let mut registry = self.registry.clone();
        bind_code_units(&mut registry, &scales)?;
        self.registry = registry;
        self.scales = scales;
        self.units = CodeUnits::new(&self.scales, &self.registry);
        Ok(())
    }

    /// Bind comoving units for a new redshift and set `h`
    ///
    /// On error the dataset is unchanged.
    pub fn set_cosmology(&mut self, cosmology: Cosmology) -> Result<()> {
        tracing::debug!(
            dataset = %self.name,
            redshift = cosmology.redshift,
            hubble = cosmology.hubble_constant,
            "binding cosmology"
        );
        bind_cosmology(
            &mut self.registry,
            cosmology.redshift,
            cosmology.hubble_constant,
        )?;
        self.cosmology = Some(cosmology);
        self.units = CodeUnits::new(&self.scales, &self.registry);
        Ok(())
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Parse a unit against this dataset's registry
    pub fn unit(&self, spec: impl UnitSpec) -> Result<Unit> {
        spec.into_unit(&self.registry)
    }

    /// A scalar in this dataset's registry
    pub fn quantity<P: IntoPayload<Dim = Ix0>>(
        &self,
        value: P,
        spec: impl UnitSpec,
    ) -> Result<Quantity> {
        make_value_with(value, spec, &self.registry)
    }

    /// An array in this dataset's registry
    pub fn array<P: IntoPayload>(&self, data: P, spec: impl UnitSpec) -> Result<UnitArray<P::Dim>> {
        make_value_with(data, spec, &self.registry)
    }

    // =========================================================================
    // Code-unit attributes
    // =========================================================================

    pub fn length_unit(&self) -> &Quantity {
        &self.units.length
    }

    pub fn mass_unit(&self) -> &Quantity {
        &self.units.mass
    }

    pub fn time_unit(&self) -> &Quantity {
        &self.units.time
    }

    pub fn velocity_unit(&self) -> &Quantity {
        &self.units.velocity
    }

    pub fn density_unit(&self) -> &Quantity {
        &self.units.density
    }

    pub fn pressure_unit(&self) -> &Quantity {
        &self.units.pressure
    }

    pub fn temperature_unit(&self) -> &Quantity {
        &self.units.temperature
    }

    pub fn magnetic_unit(&self) -> &Quantity {
        &self.units.magnetic
    }
}
