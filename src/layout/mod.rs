mod demographics;
mod footer;
mod table;
mod title;

pub(crate) use demographics::set_demographics;
pub(crate) use footer::set_footer;
pub(crate) use table::create_table;
pub(crate) use title::set_title;
