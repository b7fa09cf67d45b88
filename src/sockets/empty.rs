use anyhow::Result;
use super::{Socket, Source};

pub struct System;

impl Source for System {
    fn read(&self) -> Result<Vec<Socket>> {
        Ok(Vec::new())
    }
}
