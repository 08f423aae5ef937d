//! Digital output for link diagnostics

/// Push-pull output driving a status LED or test point
pub trait OutputPin {
    /// Drive the output to logic 1
    fn set_high(&mut self);

    /// Drive the output to logic 0
    fn set_low(&mut self);

    /// Last level driven
    fn is_set_high(&self) -> bool;

    /// Invert the driven level
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }

    /// Drive `high` as a boolean level
    fn set_state(&mut self, high: bool) {
        match high {
            true => self.set_high(),
            false => self.set_low(),
        }
    }
}
