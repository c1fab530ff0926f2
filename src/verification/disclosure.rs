//! Open/closed state of the date picker and the type dropdown

/// At most one overlay is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disclosure {
    #[default]
    Closed,
    CalendarOpen,
    DropdownOpen,
}

impl Disclosure {
    pub fn toggle_calendar(&mut self) {
        *self = match self {
            Disclosure::CalendarOpen => Disclosure::Closed,
            _ => Disclosure::CalendarOpen,
        };
    }

    pub fn toggle_dropdown(&mut self) {
        *self = match self {
            Disclosure::DropdownOpen => Disclosure::Closed,
            _ => Disclosure::DropdownOpen,
        };
    }

    /// Interaction outside both overlays.
    pub fn dismiss(&mut self) {
        *self = Disclosure::Closed;
    }

    pub fn is_calendar_open(&self) -> bool {
        *self == Disclosure::CalendarOpen
    }

    pub fn is_dropdown_open(&self) -> bool {
        *self == Disclosure::DropdownOpen
    }

    pub fn is_closed(&self) -> bool {
        *self == Disclosure::Closed
    }
}
