pub mod logging;

#[cfg(test)]
mod tests;
