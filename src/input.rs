// Input module - Standard controller shift register
//
// Port 1 protocol ($4016):
// - Write bit 0 = 1: strobe high, the controller continuously reloads
// - Write bit 0 = 0: strobe falls, the current buttons are latched
// - Each read returns the next bit in A, B, Select, Start, Up, Down, Left, Right
//   order; after all eight the data line reads 1

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Button mask as passed to `Emulator::step_cycle`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Buttons: u8 {
        const A = 0b0000_0001;
        const B = 0b0000_0010;
        const SELECT = 0b0000_0100;
        const START = 0b0000_1000;
        const UP = 0b0001_0000;
        const DOWN = 0b0010_0000;
        const LEFT = 0b0100_0000;
        const RIGHT = 0b1000_0000;
    }
}

impl Buttons {
    /// Drop the second of two opposing directions (Down for Up+Down,
    /// Right for Left+Right); a real D-pad cannot press both
    pub fn without_opposing_directions(self) -> Self {
        let mut buttons = self;
        if buttons.contains(Buttons::UP | Buttons::DOWN) {
            buttons.remove(Buttons::DOWN);
        }
        if buttons.contains(Buttons::LEFT | Buttons::RIGHT) {
            buttons.remove(Buttons::RIGHT);
        }
        buttons
    }
}

/// Standard NES controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    /// Buttons currently held by the frontend
    buttons: Buttons,
    /// Latched report being shifted out
    shift_register: u8,
    strobe: bool,
    allow_opposing_directions: bool,
}

impl Controller {
    /// Create a controller with no buttons pressed
    pub fn new() -> Self {
        Controller {
            buttons: Buttons::empty(),
            shift_register: 0,
            strobe: false,
            allow_opposing_directions: false,
        }
    }

    /// Let Up+Down and Left+Right through unfiltered
    pub fn set_allow_opposing_directions(&mut self, allow: bool) {
        self.allow_opposing_directions = allow;
    }

    /// Update the held buttons
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = if self.allow_opposing_directions {
            buttons
        } else {
            buttons.without_opposing_directions()
        };
    }

    /// Buttons currently held
    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// CPU write to $4016
    pub fn write_strobe(&mut self, value: u8) {
        let strobe = value & 1 != 0;
        if self.strobe && !strobe {
            self.shift_register = self.buttons.bits();
        }
        self.strobe = strobe;
    }

    /// CPU read from $4016 (data line only, bit 0)
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return self.buttons.contains(Buttons::A) as u8;
        }
        let bit = self.shift_register & 1;
        self.shift_register = (self.shift_register >> 1) | 0x80;
        bit
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_report(controller: &mut Controller) -> Vec<u8> {
        (0..8).map(|_| controller.read()).collect()
    }

    #[test]
    fn test_report_order() {
        let mut controller = Controller::new();
        controller.set_buttons(Buttons::A | Buttons::START | Buttons::LEFT);
        controller.write_strobe(1);
        controller.write_strobe(0);

        assert_eq!(read_report(&mut controller), vec![1, 0, 0, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_reads_after_report_return_one() {
        let mut controller = Controller::new();
        controller.write_strobe(1);
        controller.write_strobe(0);
        read_report(&mut controller);

        assert_eq!(controller.read(), 1);
        assert_eq!(controller.read(), 1);
    }

    #[test]
    fn test_strobe_high_returns_a() {
        let mut controller = Controller::new();
        controller.write_strobe(1);
        controller.set_buttons(Buttons::A | Buttons::B);
        assert_eq!(controller.read(), 1);
        assert_eq!(controller.read(), 1, "strobe high keeps reloading");

        controller.set_buttons(Buttons::B);
        assert_eq!(controller.read(), 0);
    }

    #[test]
    fn test_latch_happens_on_falling_edge() {
        let mut controller = Controller::new();
        controller.set_buttons(Buttons::B);
        controller.write_strobe(1);
        controller.write_strobe(0);
        controller.set_buttons(Buttons::A);

        assert_eq!(controller.read(), 0, "A was pressed after the latch");
        assert_eq!(controller.read(), 1);
    }

    #[test]
    fn test_opposing_directions_filtered() {
        let mut controller = Controller::new();
        controller.set_buttons(Buttons::all());
        assert_eq!(
            controller.buttons(),
            Buttons::all() - Buttons::DOWN - Buttons::RIGHT
        );

        controller.set_allow_opposing_directions(true);
        controller.set_buttons(Buttons::all());
        assert_eq!(controller.buttons(), Buttons::all());
    }
}
