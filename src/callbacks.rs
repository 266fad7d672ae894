use std::fmt;

use crate::conditions::{Conditions, FieldKind, Temperature, Wind};

type Handler<T, U> = Box<dyn Fn(T, &U) + Send + Sync>;
type TextHandler<U> = Box<dyn Fn(&str, &U) + Send + Sync>;

/// Per-field observers plus a user context handed to each of them.
///
/// ```
/// use wunderground::Callbacks;
///
/// let callbacks = Callbacks::new("station-1")
///     .on_temperature(|t, station| println!("{station}: {} C", t.celsius))
///     .on_humidity(|pct, station| println!("{station}: {pct}%"));
/// # let _ = callbacks;
/// ```
pub struct Callbacks<U = ()> {
    on_temperature: Option<Handler<Temperature, U>>,
    on_condition: Option<TextHandler<U>>,
    on_wind: Option<Handler<Wind, U>>,
    on_pressure: Option<Handler<f64, U>>,
    on_humidity: Option<Handler<u8, U>>,
    user_data: U,
}

impl Default for Callbacks<()> {
    fn default() -> Self {
        Self::new(())
    }
}

impl<U> Callbacks<U> {
    pub fn new(user_data: U) -> Self {
        Self {
            on_temperature: None,
            on_condition: None,
            on_wind: None,
            on_pressure: None,
            on_humidity: None,
            user_data,
        }
    }

    pub fn on_temperature<F>(mut self, f: F) -> Self
    where
        F: Fn(Temperature, &U) + Send + Sync + 'static,
    {
        self.on_temperature = Some(Box::new(f));
        self
    }

    pub fn on_condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &U) + Send + Sync + 'static,
    {
        self.on_condition = Some(Box::new(f));
        self
    }

    pub fn on_wind<F>(mut self, f: F) -> Self
    where
        F: Fn(Wind, &U) + Send + Sync + 'static,
    {
        self.on_wind = Some(Box::new(f));
        self
    }

    /// Pressure in hPa.
    pub fn on_pressure<F>(mut self, f: F) -> Self
    where
        F: Fn(f64, &U) + Send + Sync + 'static,
    {
        self.on_pressure = Some(Box::new(f));
        self
    }

    /// Relative humidity in percent.
    pub fn on_humidity<F>(mut self, f: F) -> Self
    where
        F: Fn(u8, &U) + Send + Sync + 'static,
    {
        self.on_humidity = Some(Box::new(f));
        self
    }

    pub fn user_data(&self) -> &U {
        &self.user_data
    }

    pub fn is_registered(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Temperature => self.on_temperature.is_some(),
            FieldKind::Condition => self.on_condition.is_some(),
            FieldKind::Wind => self.on_wind.is_some(),
            FieldKind::Pressure => self.on_pressure.is_some(),
            FieldKind::Humidity => self.on_humidity.is_some(),
        }
    }

    /// Invokes every registered handler whose field is present, in
    /// [`FieldKind::ALL`] order, and returns how many ran.
    ///
    /// Handler panics are not caught.
    pub fn dispatch(&self, conditions: &Conditions) -> usize {
        let user = &self.user_data;
        let mut invoked = 0;

        if let (Some(f), Some(t)) = (&self.on_temperature, conditions.temperature) {
            f(t, user);
            invoked += 1;
        }
        if let (Some(f), Some(text)) = (&self.on_condition, conditions.condition.as_deref()) {
            f(text, user);
            invoked += 1;
        }
        if let (Some(f), Some(w)) = (&self.on_wind, conditions.wind) {
            f(w, user);
            invoked += 1;
        }
        if let (Some(f), Some(hpa)) = (&self.on_pressure, conditions.pressure_hpa) {
            f(hpa, user);
            invoked += 1;
        }
        if let (Some(f), Some(pct)) = (&self.on_humidity, conditions.humidity_percent) {
            f(pct, user);
            invoked += 1;
        }

        invoked
    }
}

impl<U: fmt::Debug> fmt::Debug for Callbacks<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> = FieldKind::ALL
            .iter()
            .filter(|k| self.is_registered(**k))
            .map(FieldKind::as_str)
            .collect();
        f.debug_struct("Callbacks")
            .field("registered", &registered)
            .field("user_data", &self.user_data)
            .finish()
    }
}
