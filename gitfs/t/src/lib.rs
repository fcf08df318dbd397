//! Test suite for `gitfs`.


#[cfg(test)]
mod parse;



#[cfg(test)]
mod integration;
