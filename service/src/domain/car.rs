//! [`Car`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Car available for rent.
#[derive(Clone, Debug)]
pub struct Car {
    /// ID of this [`Car`].
    pub id: Id,

    /// [`Brand`] of this [`Car`].
    pub brand: Brand,

    /// [`Model`] of this [`Car`].
    pub model: Model,

    /// Manufacturing [`Year`] of this [`Car`].
    pub year: Year,

    /// [`Color`] of this [`Car`], if known.
    pub color: Option<Color>,

    /// Registration [`Plate`] of this [`Car`].
    pub plate: Plate,

    /// [`Specifications`] of this [`Car`], if any.
    pub specifications: Option<Specifications>,

    /// [`ImageUrl`] of this [`Car`] picture, if uploaded.
    pub image_url: Option<ImageUrl>,

    /// Price of renting this [`Car`] for a single day.
    pub daily_rate: Money,

    /// Indicator whether this [`Car`] can be booked.
    pub is_available: bool,

    /// [`DateTime`] when this [`Car`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Car`] was updated last time.
    pub updated_at: UpdateDateTime,
}

impl Car {
    /// Indicates whether this [`Car`] may be shown to clients as available.
    ///
    /// Records having any of the required fields blank are never listed.
    #[must_use]
    pub fn is_listable(&self) -> bool {
        self.is_available
            && !AsRef::<str>::as_ref(&self.brand).is_empty()
            && !AsRef::<str>::as_ref(&self.model).is_empty()
            && !AsRef::<str>::as_ref(&self.plate).is_empty()
            && i16::from(self.year) > 0
            && self.daily_rate.is_positive()
    }

    /// Reserves this [`Car`], making it unavailable for other bookings.
    ///
    /// # Errors
    ///
    /// With [`Unavailable`] if this [`Car`] is reserved already.
    pub fn reserve(&mut self, at: UpdateDateTime) -> Result<(), Unavailable> {
        if !self.is_available {
            return Err(Unavailable(self.id));
        }
        self.is_available = false;
        self.updated_at = at;
        Ok(())
    }

    /// Releases this [`Car`], making it available for bookings again.
    ///
    /// Returns `false` if this [`Car`] was available already, in which case
    /// nothing is changed.
    pub fn release(&mut self, at: UpdateDateTime) -> bool {
        if self.is_available {
            return false;
        }
        self.is_available = true;
        self.updated_at = at;
        true
    }
}

/// Error of reserving a [`Car`] which is not available.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`Car(id: {_0})` is not available")]
pub struct Unavailable(#[error(not(source))] pub Id);

/// ID of a [`Car`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Brand of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Brand(String);

impl Brand {
    /// Creates a new [`Brand`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `brand` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(brand: impl Into<String>) -> Self {
        Self(brand.into())
    }

    /// Creates a new [`Brand`] if the given `brand` is valid.
    #[must_use]
    pub fn new(brand: impl Into<String>) -> Option<Self> {
        let brand = brand.into();
        Self::check(&brand).then_some(Self(brand))
    }

    /// Checks whether the given `brand` is a valid [`Brand`].
    fn check(brand: impl AsRef<str>) -> bool {
        let brand = brand.as_ref();
        brand.trim() == brand && !brand.is_empty() && brand.len() <= 128
    }
}

impl FromStr for Brand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Brand`")
    }
}

/// Model of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `model` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(model: impl Into<String>) -> Self {
        Self(model.into())
    }

    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        Self::check(&model).then_some(Self(model))
    }

    /// Checks whether the given `model` is a valid [`Model`].
    fn check(model: impl AsRef<str>) -> bool {
        let model = model.as_ref();
        model.trim() == model && !model.is_empty() && model.len() <= 128
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Manufacturing year of a [`Car`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Year(i16);

impl Year {
    /// Creates a new [`Year`] if the given `year` is valid.
    #[must_use]
    pub fn new(year: impl TryInto<i16>) -> Option<Self> {
        let year = year.try_into().ok()?;
        (year > 0).then_some(Self(year))
    }
}

/// Color of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Color(String);

impl Color {
    /// Creates a new [`Color`] if the given `color` is valid.
    #[must_use]
    pub fn new(color: impl Into<String>) -> Option<Self> {
        let color = color.into();
        Self::check(&color).then_some(Self(color))
    }

    /// Checks whether the given `color` is a valid [`Color`].
    fn check(color: impl AsRef<str>) -> bool {
        let color = color.as_ref();
        color.trim() == color && !color.is_empty() && color.len() <= 64
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Color`")
    }
}

/// Registration plate number of a [`Car`].
///
/// Always stored in upper case without surrounding whitespace, so the same
/// plate typed differently is still considered the same.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Plate(String);

impl Plate {
    /// Creates a new [`Plate`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `plate` is normalized and
    /// matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(plate: impl Into<String>) -> Self {
        Self(plate.into())
    }

    /// Creates a new normalized [`Plate`] if the given `plate` is valid.
    #[must_use]
    pub fn new(plate: impl AsRef<str>) -> Option<Self> {
        let plate = plate.as_ref().trim().to_uppercase();
        Self::check(&plate).then_some(Self(plate))
    }

    /// Checks whether the given `plate` is a valid [`Plate`].
    fn check(plate: impl AsRef<str>) -> bool {
        let plate = plate.as_ref();
        !plate.is_empty()
            && plate.len() <= 16
            && plate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
    }
}

impl FromStr for Plate {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Plate`")
    }
}

/// Free-form technical specifications of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Specifications(String);

impl Specifications {
    /// Creates new [`Specifications`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.trim().is_empty() && text.len() <= 4096).then_some(Self(text))
    }
}

impl FromStr for Specifications {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Specifications`")
    }
}

/// URL of an uploaded [`Car`] picture.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    ///
    /// Both absolute `http(s)` URLs and absolute paths are accepted.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        (url.starts_with("https://")
            || url.starts_with("http://")
            || url.starts_with('/'))
            && url.len() <= 2048
            && !url.contains(char::is_whitespace)
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// [`DateTime`] when a [`Car`] was created.
pub type CreationDateTime = DateTimeOf<(Car, unit::Creation)>;

/// [`DateTime`] when a [`Car`] was updated.
pub type UpdateDateTime = DateTimeOf<(Car, unit::Update)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use super::{Brand, Car, Id, Model, Plate, Year};

    fn car() -> Car {
        Car {
            id: Id::new(),
            brand: Brand::new("Toyota").unwrap(),
            model: Model::new("RAV4").unwrap(),
            year: Year::new(2021).unwrap(),
            color: None,
            plate: Plate::new("rad 123 b").unwrap(),
            specifications: None,
            image_url: None,
            daily_rate: Money {
                amount: Decimal::from(10_000),
                currency: Currency::Rwf,
            },
            is_available: true,
            created_at: DateTime::UNIX_EPOCH.coerce(),
            updated_at: DateTime::UNIX_EPOCH.coerce(),
        }
    }

    #[test]
    fn normalizes_plate() {
        let plate = Plate::new(" rad 123 b ").unwrap();
        assert_eq!(AsRef::<str>::as_ref(&plate), "RAD 123 B");
        assert!(Plate::new("   ").is_none());
        assert!(Plate::new("RAD#123").is_none());
    }

    #[test]
    fn reserves_only_once() {
        let mut car = car();
        let now = DateTime::from_rfc3339("2024-05-01T10:00:00Z").unwrap();

        car.reserve(now.coerce()).unwrap();
        assert!(!car.is_available);
        assert_eq!(car.updated_at, now.coerce());

        let later = now + std::time::Duration::from_secs(60);
        assert!(car.reserve(later.coerce()).is_err());
        assert_eq!(car.updated_at, now.coerce(), "untouched on failure");
    }

    #[test]
    fn releases_idempotently() {
        let mut car = car();
        let now = DateTime::from_rfc3339("2024-05-01T10:00:00Z").unwrap();

        assert!(!car.release(now.coerce()));
        assert_eq!(car.updated_at, DateTime::UNIX_EPOCH.coerce());

        car.reserve(now.coerce()).unwrap();
        assert!(car.release(now.coerce()));
        assert!(car.is_available);
    }

    #[test]
    fn lists_only_complete_available_cars() {
        assert!(car().is_listable());

        let mut reserved = car();
        reserved.is_available = false;
        assert!(!reserved.is_listable());

        let mut free = car();
        free.daily_rate.amount = Decimal::ZERO;
        assert!(!free.is_listable());
    }
}
