/// Two-channel LED colors for the Launch Control XL
///
/// Each LED has a red and a green element with four brightness levels
/// (0-3). The controller expects both packed into one byte: red in the low
/// nibble, green in the high nibble.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0);
    pub const RED_1: Color = Color::new(1, 0);
    pub const RED_2: Color = Color::new(2, 0);
    pub const RED_3: Color = Color::new(3, 0);
    pub const GREEN_1: Color = Color::new(0, 1);
    pub const GREEN_2: Color = Color::new(0, 2);
    pub const GREEN_3: Color = Color::new(0, 3);
    pub const YELLOW_1: Color = Color::new(1, 1);
    pub const YELLOW_2: Color = Color::new(2, 2);
    pub const YELLOW_3: Color = Color::new(3, 3);
    pub const AMBER_2: Color = Color::new(2, 1);
    pub const AMBER_3: Color = Color::new(3, 2);
    pub const DARK_AMBER_3: Color = Color::new(3, 1);
    pub const GREEN_YELLOW_2: Color = Color::new(1, 2);
    pub const GREEN_YELLOW_3: Color = Color::new(2, 3);
    pub const MORE_GREEN_YELLOW_3: Color = Color::new(1, 3);

    pub const fn new(red: u8, green: u8) -> Self {
        Self { red, green }
    }

    /// Pack into the byte the controller understands.
    ///
    /// Components are expected in 0..=3; larger values produce a
    /// meaningless byte but never panic.
    pub fn encode(self) -> u8 {
        self.red.wrapping_add(self.green << 4)
    }

    pub fn decode(byte: u8) -> Self {
        Self {
            red: byte & 15,
            green: byte >> 4,
        }
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.encode()
    }
}

impl From<u8> for Color {
    fn from(byte: u8) -> Self {
        Color::decode(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(Color::OFF.encode(), 0);
        assert_eq!(Color::RED_3.encode(), 0x03);
        assert_eq!(Color::GREEN_3.encode(), 0x30);
        assert_eq!(Color::AMBER_3.encode(), 0x23);
    }

    #[test]
    fn test_round_trip_all_levels() {
        for red in 0..=3 {
            for green in 0..=3 {
                let color = Color::new(red, green);
                assert_eq!(Color::decode(color.encode()), color);
            }
        }
    }

    #[test]
    fn test_out_of_range_does_not_panic() {
        let _ = Color::new(255, 255).encode();
    }
}
