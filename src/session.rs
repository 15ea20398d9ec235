use crate::{
    compiler::Compiler,
    error::CompileError,
    eval::Solution,
    units::UnitSystem,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    SystemChanged(UnitSystem),
    Shows(String),
}

/// A numeric edit box: every line either switches the unit system or is an
/// expression that may continue from the last good result.
pub struct Session {
    compiler: Compiler,
    previous: Solution,
}

impl Session {
    pub fn new(compiler: Compiler) -> Self {
        let previous = Solution::new(0.0, compiler.default_unit());
        Session { compiler, previous }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn previous(&self) -> &Solution {
        &self.previous
    }

    /// Handles one line of input. On error the previous result is kept.
    pub fn handle(&mut self, line: &str) -> Result<Reply, CompileError> {
        if let Ok(system) = line.parse::<UnitSystem>() {
            self.compiler.set_output_system(system);
            self.previous = Solution::new(0.0, self.compiler.default_unit());
            return Ok(Reply::SystemChanged(system));
        }

        let solution = self.compiler.eval(line, Some(&self.previous))?;
        self.previous = solution;
        Ok(Reply::Shows(self.compiler.format(&solution)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{locale::FixedLocale, units::Unit};

    fn session() -> Session {
        let mut compiler = Compiler::new().with_locale(FixedLocale('.'));
        compiler.set_output_system(UnitSystem::Metric);
        Session::new(compiler)
    }

    fn shows(text: &str) -> Result<Reply, CompileError> {
        Ok(Reply::Shows(text.to_string()))
    }

    #[test]
    fn continues_in_previous_unit() {
        let mut session = session();
        assert_eq!(session.handle("120mm").unwrap(), shows("120mm").unwrap());
        assert_eq!(session.handle("+5").unwrap(), shows("5mm").unwrap());
        assert!(session.handle("*2").is_err());
        assert_eq!(session.handle("7").unwrap(), shows("7mm").unwrap());
    }

    #[test]
    fn keeps_previous_on_error() {
        let mut session = session();
        session.handle("2m").unwrap();
        let before = *session.previous();
        assert!(session.handle("2 $").is_err());
        assert_eq!(*session.previous(), before);
    }

    #[test]
    fn switching_system_reseeds() {
        let mut session = session();
        session.handle("2m").unwrap();
        let reply = session.handle("imperial").unwrap();
        assert_eq!(reply, Reply::SystemChanged(UnitSystem::Imperial));
        assert_eq!(session.compiler().output_system(), UnitSystem::Imperial);
        let feet = Unit::new(12000.0, UnitSystem::Imperial);
        assert_eq!(*session.previous(), Solution::new(0.0, feet));
        assert_eq!(session.handle("3").unwrap(), shows("3ft").unwrap());
        let reply = session.handle("generic").unwrap();
        assert_eq!(reply, Reply::SystemChanged(UnitSystem::Generic));
        assert_eq!(session.handle("3 / 4").unwrap(), shows("0.75").unwrap());
    }
}
