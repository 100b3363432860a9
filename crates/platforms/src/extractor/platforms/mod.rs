pub mod sportdeutschland;
