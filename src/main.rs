use eun_update::eun_run;

fn main() {
    eun_run();
}
