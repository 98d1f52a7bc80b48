pub const URL_PATH_RPC: &str = "/rpc";
