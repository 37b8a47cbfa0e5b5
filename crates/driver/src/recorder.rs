use shuttle_core::{AllocError, Component, VariableDirectory, VariableType};

use crate::error::{Call, Error, Phase};

/// How a [`Recorder`] keeps the values it samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recording {
    /// Keep only the most recent sample, overwriting it on every step.
    Latest,

    /// Keep every sample as one growable series per slot.
    Series,
}

/// Samples the tracked variables of a component after each committed step.
///
/// Slots mirror the positions of the [`VariableDirectory`]. Slot 0 is the
/// directory's reserved leading slot and holds the simulation time rather than
/// a value fetched from the component. Variables whose type has no numeric
/// accessor (`Boolean`, `String`) are skipped: their series stays empty and
/// their latest value stays `NaN`.
#[derive(Debug, Clone)]
pub struct Recorder {
    recording: Recording,
    latest: Vec<f64>,
    series: Vec<Vec<f64>>,
}

impl Recorder {
    /// Creates a recorder for `slots` slots.
    ///
    /// Series start empty and grow on demand.
    pub(crate) fn new(recording: Recording, slots: usize) -> Self {
        let series = match recording {
            Recording::Latest => Vec::new(),
            Recording::Series => vec![Vec::new(); slots],
        };
        Self {
            recording,
            latest: vec![f64::NAN; slots],
            series,
        }
    }

    /// Reserves room for `samples` more samples in every series.
    ///
    /// Does nothing with [`Recording::Latest`].
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the room cannot be reserved.
    pub(crate) fn reserve(&mut self, samples: usize) -> Result<(), AllocError> {
        for series in &mut self.series {
            series
                .try_reserve_exact(samples)
                .map_err(|_| AllocError { len: samples })?;
        }
        Ok(())
    }

    /// Fetches every tracked variable from the component.
    ///
    /// Reals use the real accessor; integers use the integer accessor and are
    /// widened to `f64`.
    pub(crate) fn sample<C: Component>(
        &mut self,
        component: &mut C,
        directory: &VariableDirectory,
        time: f64,
        phase: Phase,
    ) -> Result<(), Error> {
        if let Some(slot) = self.latest.first_mut() {
            *slot = time;
        }

        for (slot, variable) in directory.tracked() {
            let references = [variable.value_reference];
            let value = match variable.kind {
                VariableType::Real => {
                    let mut values = [0.0];
                    let status = component.get_real(&references, &mut values);
                    phase.check(Call::GetReal, status, time)?;
                    values[0]
                }
                VariableType::Integer => {
                    let mut values = [0];
                    let status = component.get_integer(&references, &mut values);
                    phase.check(Call::GetInteger, status, time)?;
                    f64::from(values[0])
                }
                VariableType::Boolean | VariableType::String => continue,
            };
            self.latest[slot] = value;
        }

        // Series only grow once every accessor succeeded, so a failed sample
        // never leaves them with uneven lengths.
        if let Some(series) = self.series.first_mut() {
            series.push(time);
        }
        for (slot, variable) in directory.tracked() {
            if let (VariableType::Real | VariableType::Integer, Some(series)) =
                (variable.kind, self.series.get_mut(slot))
            {
                series.push(self.latest[slot]);
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn recording(&self) -> Recording {
        self.recording
    }

    /// Returns the most recent sample, indexed by slot.
    #[must_use]
    pub fn latest(&self) -> &[f64] {
        &self.latest
    }

    /// Returns the recorded series for `slot`.
    ///
    /// Always empty with [`Recording::Latest`].
    #[must_use]
    pub fn series(&self, slot: usize) -> &[f64] {
        self.series.get(slot).map_or(&[], Vec::as_slice)
    }

    /// Consumes the recorder and returns every series, indexed by slot.
    #[must_use]
    pub fn into_series(self) -> Vec<Vec<f64>> {
        self.series
    }
}
