mod catalog;
mod screen;
