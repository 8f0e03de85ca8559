pub mod mock_io;
